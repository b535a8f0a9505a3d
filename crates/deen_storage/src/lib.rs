pub mod config_store;
pub mod error;

pub use config_store::{Preferences, TomlConfigStore};
pub use error::StorageError;
