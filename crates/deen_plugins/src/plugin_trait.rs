use crate::error::{PluginError, Result};
use deen_domain::{Direction, PluginDescriptor};

/// Core trait that all plugins must implement.
///
/// Plugins hold no state between calls; every invocation takes the input
/// bytes by reference and returns a fresh buffer.
pub trait Plugin: Send + Sync {
    fn descriptor(&self) -> &PluginDescriptor;

    /// Whether everything this plugin needs is present. Must not mutate state.
    fn prerequisites(&self) -> bool {
        true
    }

    /// Forward transformation (encode, hash, format, ...).
    fn process(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Inverse transformation. Only meaningful when the descriptor is reversible.
    fn unprocess(&self, _data: &[u8]) -> Result<Vec<u8>> {
        Err(PluginError::Unsupported {
            plugin: self.name().to_string(),
            operation: Direction::Reverse.operation(),
        })
    }

    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Run `process` or `unprocess`, checking the capability flag first.
    fn apply(&self, direction: Direction, data: &[u8]) -> Result<Vec<u8>> {
        match direction {
            Direction::Forward => self.process(data),
            Direction::Reverse if self.descriptor().reversible => self.unprocess(data),
            Direction::Reverse => Err(PluginError::Unsupported {
                plugin: self.name().to_string(),
                operation: direction.operation(),
            }),
        }
    }
}
