use thiserror::Error;

/// Failure of a single `process`/`unprocess` call. Stays local to the stage
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    #[error("{plugin}: malformed input: {message}")]
    Format { plugin: String, message: String },

    #[error("{plugin} does not support {operation}")]
    Unsupported {
        plugin: String,
        operation: &'static str,
    },

    #[error("{plugin} is unavailable: prerequisites not met")]
    Unavailable { plugin: String },
}

impl PluginError {
    pub fn format(plugin: impl Into<String>, message: impl ToString) -> Self {
        Self::Format {
            plugin: plugin.into(),
            message: message.to_string(),
        }
    }
}

/// Raised while populating the registry; fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate plugin key '{key}' (already registered by '{existing}')")]
    DuplicateName { key: String, existing: String },

    #[error("plugin name must not be empty")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, PluginError>;
