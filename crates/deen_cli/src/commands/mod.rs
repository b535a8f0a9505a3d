pub mod apply;
pub mod chain;
pub mod list;

use anyhow::{Result, bail};
use deen_plugins::{Plugin, PluginRegistry};
use std::sync::Arc;

/// Find a plugin by name, alias or display name.
pub fn find_plugin<'r>(registry: &'r PluginRegistry, key: &str) -> Result<&'r Arc<dyn Plugin>> {
    match registry
        .lookup(key)
        .or_else(|| registry.lookup_display(key))
    {
        Some(plugin) => Ok(plugin),
        None => bail!("Unknown plugin '{}'. Run 'deen list' to see what is available.", key),
    }
}
