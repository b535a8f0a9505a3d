use chrono::{DateTime, Utc};
use deen_domain::Direction;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryEvent {
    SessionStarted {
        command: String,
        input_len: usize,
        timestamp: DateTime<Utc>,
    },
    StageApplied {
        index: usize,
        plugin: String,
        direction: Direction,
        input_len: usize,
        output_len: usize,
        duration_us: u64,
        timestamp: DateTime<Utc>,
    },
    StageFailed {
        index: usize,
        plugin: String,
        direction: Direction,
        message: String,
        timestamp: DateTime<Utc>,
    },
    ChainCompleted {
        stages: usize,
        failed: usize,
        output_len: usize,
        elapsed_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

impl TelemetryEvent {
    pub fn session_started(command: impl Into<String>, input_len: usize) -> Self {
        Self::SessionStarted {
            command: command.into(),
            input_len,
            timestamp: Utc::now(),
        }
    }

    pub fn stage_applied(
        index: usize,
        plugin: impl Into<String>,
        direction: Direction,
        input_len: usize,
        output_len: usize,
        duration_us: u64,
    ) -> Self {
        Self::StageApplied {
            index,
            plugin: plugin.into(),
            direction,
            input_len,
            output_len,
            duration_us,
            timestamp: Utc::now(),
        }
    }

    pub fn stage_failed(
        index: usize,
        plugin: impl Into<String>,
        direction: Direction,
        message: impl Into<String>,
    ) -> Self {
        Self::StageFailed {
            index,
            plugin: plugin.into(),
            direction,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn chain_completed(stages: usize, failed: usize, output_len: usize, elapsed_secs: f64) -> Self {
        Self::ChainCompleted {
            stages,
            failed,
            output_len,
            elapsed_secs,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "SessionStarted",
            Self::StageApplied { .. } => "StageApplied",
            Self::StageFailed { .. } => "StageFailed",
            Self::ChainCompleted { .. } => "ChainCompleted",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionStarted { timestamp, .. }
            | Self::StageApplied { timestamp, .. }
            | Self::StageFailed { timestamp, .. }
            | Self::ChainCompleted { timestamp, .. } => *timestamp,
        }
    }

    /// Short human summary, without kind or timestamp.
    pub fn details(&self) -> String {
        match self {
            Self::SessionStarted {
                command, input_len, ..
            } => format!("{command} on {input_len} bytes"),
            Self::StageApplied {
                index,
                plugin,
                direction,
                input_len,
                output_len,
                duration_us,
                ..
            } => format!(
                "#{index} {plugin} ({direction}) {input_len} -> {output_len} bytes in {duration_us}us"
            ),
            Self::StageFailed {
                index,
                plugin,
                direction,
                message,
                ..
            } => format!("#{index} {plugin} ({direction}): {message}"),
            Self::ChainCompleted {
                stages,
                failed,
                output_len,
                elapsed_secs,
                ..
            } => format!(
                "{stages} stages, {failed} failed, {output_len} bytes out in {elapsed_secs:.3}s"
            ),
        }
    }
}
