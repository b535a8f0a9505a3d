//! The transformation chain: an ordered list of plugin stages applied to a
//! root buffer, with per-stage status and cascade re-execution on edits.

pub mod chain;
pub mod stage;

pub use chain::{Chain, ChainError};
pub use stage::{Stage, StageReport, StageStatus};
