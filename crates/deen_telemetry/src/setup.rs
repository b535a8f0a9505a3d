use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialize telemetry: {0}")]
    Init(String),
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub level: tracing::Level,
    /// One JSON object per log line instead of the human formatter.
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::WARN,
            json_output: false,
        }
    }
}

impl TelemetryConfig {
    /// Build a config from a textual level such as `"info"` or `"DEBUG"`.
    pub fn from_level_str(level: &str, json_output: bool) -> Result<Self, TelemetryError> {
        let level = level
            .trim()
            .parse::<tracing::Level>()
            .map_err(|_| TelemetryError::InvalidLevel(level.to_string()))?;
        Ok(Self { level, json_output })
    }
}

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` wins over `config.level`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json_output {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| TelemetryError::Init(e.to_string()))
}
