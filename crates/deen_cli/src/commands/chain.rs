use anyhow::{Context, Result};
use console::style;
use deen_domain::{Buffer, Direction};
use deen_engine::{Chain, StageReport, StageStatus};
use deen_plugins::{InputArgs, PluginRegistry};
use deen_storage::Preferences;
use deen_telemetry::{ExportFormat, TelemetryEvent, export_log};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::EventsFormat;

/// One `key[:direction]` argument of `deen chain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub key: String,
    pub direction: Direction,
}

impl FromStr for ChainStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = match s.rsplit_once(':') {
            Some((key, suffix)) => (key, suffix.parse::<Direction>()?),
            None => (s, Direction::Forward),
        };
        if key.is_empty() {
            return Err(format!("missing plugin name in step '{s}'"));
        }
        Ok(Self {
            key: key.to_string(),
            direction,
        })
    }
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Forward => f.write_str(&self.key),
            Direction::Reverse => write!(f, "{}:r", self.key),
        }
    }
}

impl From<EventsFormat> for ExportFormat {
    fn from(value: EventsFormat) -> Self {
        match value {
            EventsFormat::Json => ExportFormat::Json,
            EventsFormat::Csv => ExportFormat::Csv,
            EventsFormat::Plain => ExportFormat::PlainText,
        }
    }
}

fn report_event(report: &StageReport) -> TelemetryEvent {
    match &report.status {
        StageStatus::Failed(e) => {
            TelemetryEvent::stage_failed(report.index, &report.plugin, report.direction, e.to_string())
        }
        _ => TelemetryEvent::stage_applied(
            report.index,
            &report.plugin,
            report.direction,
            report.input_len,
            report.output_len,
            u64::try_from(report.elapsed.as_micros()).unwrap_or(u64::MAX),
        ),
    }
}

fn print_stages(chain: &Chain) {
    for (index, stage) in chain.stages().iter().enumerate() {
        let name = &stage.descriptor().name;
        match stage.status().error() {
            Some(e) => eprintln!(
                "  {} {} {} ({}): {}",
                style("✗").red().bold(),
                style(index).dim(),
                name,
                stage.direction(),
                style(e).red()
            ),
            None => eprintln!(
                "  {} {} {} ({}) {} bytes",
                style("✓").green().bold(),
                style(index).dim(),
                name,
                stage.direction(),
                stage.output().map_or(0, Buffer::len)
            ),
        }
    }
}

pub fn run(
    registry: Arc<PluginRegistry>,
    prefs: &Preferences,
    steps: &[ChainStep],
    input: &InputArgs,
    events_out: Option<(PathBuf, EventsFormat)>,
    ascii: bool,
) -> Result<()> {
    let root = input.read_input(prefs.input_encoding, std::io::stdin().lock())?;
    if root.is_empty() {
        info!("No input given, nothing written");
        return Ok(());
    }

    let started = Instant::now();
    let mut events = vec![TelemetryEvent::session_started("chain", root.len())];
    let mut chain = Chain::with_root(registry, root);
    for step in steps {
        chain
            .append(&step.key, step.direction)
            .with_context(|| format!("Cannot add step '{step}'"))?;
        events.extend(chain.last_run().iter().map(report_event));
    }

    print_stages(&chain);
    let failed = chain.failed_stages();
    if !failed.is_empty() {
        eprintln!(
            "{} {} of {} stages failed; their input was passed through",
            style("!").yellow().bold(),
            failed.len(),
            chain.len()
        );
    }

    let output = chain.final_output();
    events.push(TelemetryEvent::chain_completed(
        chain.len(),
        failed.len(),
        output.len(),
        started.elapsed().as_secs_f64(),
    ));

    if let Some((path, format)) = events_out {
        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create events file {}", path.display()))?;
        export_log(&events, format.into(), &mut file).context("Failed to export events")?;
        info!("Wrote {} events to {}", events.len(), path.display());
    }

    let mut stdout = std::io::stdout().lock();
    let written = if ascii {
        writeln!(stdout, "{}", output.printable_ascii())
    } else {
        stdout.write_all(output.as_bytes())
    };
    written
        .and_then(|_| stdout.flush())
        .context("Failed to write output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_defaults_to_forward() {
        let step: ChainStep = "base64".parse().unwrap();
        assert_eq!(step.key, "base64");
        assert_eq!(step.direction, Direction::Forward);
    }

    #[test]
    fn test_step_reverse_suffix() {
        let step: ChainStep = "b64:r".parse().unwrap();
        assert_eq!(step.key, "b64");
        assert_eq!(step.direction, Direction::Reverse);
        assert_eq!(step.to_string(), "b64:r");

        let long: ChainStep = "hex:reverse".parse().unwrap();
        assert_eq!(long.direction, Direction::Reverse);
    }

    #[test]
    fn test_step_rejects_bad_suffix_and_empty_key() {
        assert!("hex:sideways".parse::<ChainStep>().is_err());
        assert!(":r".parse::<ChainStep>().is_err());
    }

    #[test]
    fn test_report_event_maps_failure() {
        let registry = Arc::new(PluginRegistry::with_builtins().unwrap());
        let mut chain = Chain::with_root(registry, Buffer::from(b"{bad json"));
        chain.append("json_formatter", Direction::Forward).unwrap();

        let event = report_event(&chain.last_run()[0]);
        assert_eq!(event.kind(), "StageFailed");
    }
}
