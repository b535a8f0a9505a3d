use crate::events::TelemetryEvent;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One serialized event per line.
    #[default]
    Json,
    Csv,
    PlainText,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "plain" | "text" | "txt" => Ok(Self::PlainText),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

pub fn export_log(
    events: &[TelemetryEvent],
    format: ExportFormat,
    writer: &mut dyn Write,
) -> Result<(), std::io::Error> {
    match format {
        ExportFormat::Json => {
            for event in events {
                serde_json::to_writer(&mut *writer, event)?;
                writeln!(writer)?;
            }
        }
        ExportFormat::PlainText => {
            for event in events {
                writeln!(
                    writer,
                    "[{}] {}: {}",
                    event.timestamp().to_rfc3339(),
                    event.kind(),
                    event.details()
                )?;
            }
        }
        ExportFormat::Csv => {
            writeln!(writer, "type,timestamp,details")?;
            for event in events {
                writeln!(
                    writer,
                    "{},{},{}",
                    event.kind(),
                    event.timestamp().to_rfc3339(),
                    csv_field(&event.details())
                )?;
            }
        }
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
