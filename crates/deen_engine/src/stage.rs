use deen_domain::{Buffer, Direction, PluginDescriptor};
use deen_plugins::{Plugin, PluginError};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Lifecycle of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    /// Not yet run against the current input.
    Pending,
    Success,
    /// The plugin rejected its input; the stage passes that input through.
    Failed(PluginError),
}

impl StageStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&PluginError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "failed: {e}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One link of a chain: a plugin, the direction it runs in, and what it produced.
pub struct Stage {
    plugin: Arc<dyn Plugin>,
    direction: Direction,
    status: StageStatus,
    output: Option<Buffer>,
}

impl Stage {
    pub(crate) fn new(plugin: Arc<dyn Plugin>, direction: Direction) -> Self {
        Self {
            plugin,
            direction,
            status: StageStatus::Pending,
            output: None,
        }
    }

    pub fn plugin(&self) -> &Arc<dyn Plugin> {
        &self.plugin
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        self.plugin.descriptor()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn status(&self) -> &StageStatus {
        &self.status
    }

    /// `None` while pending.
    pub fn output(&self) -> Option<&Buffer> {
        self.output.as_ref()
    }

    pub(crate) fn invalidate(&mut self) {
        self.status = StageStatus::Pending;
        self.output = None;
    }

    /// Run the plugin on `input`. On failure the output is `input`, byte for byte.
    pub(crate) fn execute(&mut self, index: usize, input: &Buffer) -> StageReport {
        let started = Instant::now();
        let name = self.plugin.name().to_string();

        let (status, output) = match self.plugin.apply(self.direction, input.as_bytes()) {
            Ok(bytes) => {
                debug!(
                    "Stage {} ({} {}) produced {} bytes",
                    index,
                    name,
                    self.direction,
                    bytes.len()
                );
                (StageStatus::Success, Buffer::from(bytes))
            }
            Err(e) => {
                warn!("Stage {} ({} {}) failed: {}", index, name, self.direction, e);
                (StageStatus::Failed(e), input.clone())
            }
        };

        let report = StageReport {
            index,
            plugin: name,
            direction: self.direction,
            status: status.clone(),
            input_len: input.len(),
            output_len: output.len(),
            elapsed: started.elapsed(),
        };
        self.status = status;
        self.output = Some(output);
        report
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("plugin", &self.plugin.name())
            .field("direction", &self.direction)
            .field("status", &self.status)
            .field("output_len", &self.output.as_ref().map(Buffer::len))
            .finish()
    }
}

/// What happened to one stage during the most recent execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub index: usize,
    pub plugin: String,
    pub direction: Direction,
    pub status: StageStatus,
    pub input_len: usize,
    pub output_len: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use deen_plugins::builtin::{HexCodec, JsonFormatter};

    #[test]
    fn test_new_stage_is_pending() {
        let stage = Stage::new(Arc::new(HexCodec::new()), Direction::Forward);
        assert!(stage.status().is_pending());
        assert!(stage.output().is_none());
    }

    #[test]
    fn test_execute_success() {
        let mut stage = Stage::new(Arc::new(HexCodec::new()), Direction::Forward);
        let report = stage.execute(0, &Buffer::from(b"A"));
        assert!(stage.status().is_success());
        assert_eq!(stage.output().unwrap().as_bytes(), b"41");
        assert_eq!(report.input_len, 1);
        assert_eq!(report.output_len, 2);
        assert_eq!(report.plugin, "hex");
    }

    #[test]
    fn test_execute_failure_passes_input_through() {
        let mut stage = Stage::new(Arc::new(JsonFormatter::new()), Direction::Forward);
        let input = Buffer::from(b"{bad json");
        let report = stage.execute(3, &input);

        assert!(stage.status().is_failed());
        assert!(stage.status().error().is_some());
        assert_eq!(stage.output(), Some(&input));
        assert_eq!(report.index, 3);
        assert!(report.status.is_failed());
    }

    #[test]
    fn test_invalidate_resets_to_pending() {
        let mut stage = Stage::new(Arc::new(HexCodec::new()), Direction::Forward);
        stage.execute(0, &Buffer::from(b"A"));
        stage.invalidate();
        assert!(stage.status().is_pending());
        assert!(stage.output().is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StageStatus::Success.to_string(), "success");
        let failed = StageStatus::Failed(PluginError::format("hex", "odd length"));
        assert_eq!(failed.to_string(), "failed: hex: malformed input: odd length");
    }
}
