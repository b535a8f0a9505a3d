//! Umbrella crate for the deen-rs workspace.
//!
//! Re-exports the member crates so end-to-end tests and benchmarks can
//! reach everything through one dependency.

pub use deen_domain as domain;
pub use deen_engine as engine;
pub use deen_plugins as plugins;
pub use deen_storage as storage;
pub use deen_telemetry as telemetry;
