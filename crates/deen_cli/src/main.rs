use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deen_domain::Category;
use deen_plugins::{InputArgs, PluginRegistry};
use deen_storage::{Preferences, TomlConfigStore};
use deen_telemetry::{TelemetryConfig, init_telemetry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

mod commands;

#[derive(Parser)]
#[command(name = "deen")]
#[command(version, about = "Encode, decode, hash and format data through chainable plugins", long_about = None)]
struct Cli {
    /// Preferences file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered plugins
    List {
        /// Only show plugins of this category
        #[arg(long)]
        category: Option<ListCategory>,

        /// Include plugins whose prerequisites are not met
        #[arg(long)]
        all: bool,
    },

    /// Apply a single plugin and write the raw result to stdout
    Apply {
        /// Plugin name, alias or display name
        plugin: String,

        /// Input data (takes precedence over --file)
        data: Option<String>,

        /// Run the inverse operation
        #[arg(short, long)]
        revert: bool,

        /// Read input from a file, or `-` for stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Run input through a sequence of plugins
    Chain {
        /// Steps in order: `key` runs forward, `key:r` runs the inverse
        #[arg(required = true)]
        steps: Vec<commands::chain::ChainStep>,

        /// Input data (takes precedence over --file)
        #[arg(long)]
        data: Option<String>,

        /// Read input from a file, or `-` for stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Write telemetry events for this run to a file
        #[arg(long)]
        events: Option<PathBuf>,

        /// Format of the --events file
        #[arg(long, default_value = "json")]
        events_format: EventsFormat,

        /// Print the result as printable ASCII instead of raw bytes
        #[arg(long)]
        ascii: bool,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ListCategory {
    Codec,
    Compression,
    Hash,
    Formatter,
    Other,
}

impl From<ListCategory> for Category {
    fn from(value: ListCategory) -> Self {
        match value {
            ListCategory::Codec => Category::Codec,
            ListCategory::Compression => Category::Compression,
            ListCategory::Hash => Category::Hash,
            ListCategory::Formatter => Category::Formatter,
            ListCategory::Other => Category::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum EventsFormat {
    Json,
    Csv,
    Plain,
}

fn load_preferences(path: Option<PathBuf>) -> Result<Preferences> {
    let store = match path {
        Some(path) => TomlConfigStore::new(path),
        None => match TomlConfigStore::at_default_location() {
            Ok(store) => store,
            // No config directory on this platform: run with defaults.
            Err(_) => return Ok(Preferences::default()),
        },
    };
    store
        .load_preferences()
        .with_context(|| format!("Failed to load preferences from {}", store.path().display()))
}

fn telemetry_config(prefs: &Preferences, verbose: u8) -> Result<TelemetryConfig> {
    let level = match verbose {
        0 => prefs.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    TelemetryConfig::from_level_str(level, prefs.json_logs).context("Invalid log_level in preferences")
}

/// Built-in registry minus anything the preferences disable.
fn build_registry(prefs: &Preferences) -> Result<Arc<PluginRegistry>> {
    let mut registry = PluginRegistry::with_builtins().context("Failed to register built-in plugins")?;
    let removed = registry.retain(|descriptor| !descriptor.keys().any(|key| prefs.is_disabled(key)));
    if removed > 0 {
        info!("{} plugins disabled by preferences", removed);
    }
    Ok(Arc::new(registry))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let prefs = load_preferences(cli.config)?;
    init_telemetry(&telemetry_config(&prefs, cli.verbose)?)?;
    debug!("Preferences: {:?}", prefs);

    let registry = build_registry(&prefs)?;

    match cli.command {
        Commands::List { category, all } => commands::list::run(&registry, category.map(Into::into), all),
        Commands::Apply {
            plugin,
            data,
            revert,
            file,
        } => commands::apply::run(&registry, &prefs, &plugin, data, revert, file),
        Commands::Chain {
            steps,
            data,
            file,
            events,
            events_format,
            ascii,
        } => commands::chain::run(
            registry,
            &prefs,
            &steps,
            &InputArgs {
                data,
                file,
                revert: false,
            },
            events.map(|path| (path, events_format)),
            ascii,
        ),
    }
}
