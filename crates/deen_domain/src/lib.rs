//! Core types shared by every deen-rs crate: the byte [`Buffer`] that flows
//! through a chain, the text [`Encoding`]s it can be viewed in, and the
//! metadata plugins describe themselves with.

pub mod buffer;
pub mod encoding;
pub mod plugin;

pub use buffer::{Buffer, TextView};
pub use encoding::{Encoding, EncodingError};
pub use plugin::{Category, Direction, PluginDescriptor};
