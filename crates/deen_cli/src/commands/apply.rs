use anyhow::{Context, Result, bail};
use deen_plugins::{InputArgs, Invocation, PluginRegistry};
use deen_storage::Preferences;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::find_plugin;

pub fn run(
    registry: &PluginRegistry,
    prefs: &Preferences,
    key: &str,
    data: Option<String>,
    revert: bool,
    file: Option<PathBuf>,
) -> Result<()> {
    let plugin = find_plugin(registry, key)?;
    if !plugin.prerequisites() {
        bail!("Plugin '{}' is unavailable on this system", plugin.name());
    }

    let args = InputArgs { data, file, revert };
    let output = Invocation::new(plugin.as_ref())
        .with_encoding(prefs.input_encoding)
        .run(&args, std::io::stdin().lock())
        .with_context(|| format!("{} failed", plugin.name()))?;

    let Some(output) = output else {
        info!("No input given, nothing written");
        return Ok(());
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write output")?;
    Ok(())
}
