use crate::builtin;
use crate::error::RegistryError;
use crate::plugin_trait::Plugin;
use deen_domain::{Category, PluginDescriptor};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Index of every known plugin, keyed by internal name and aliases.
///
/// Populated once at startup and read-only afterwards; share it between
/// chains through an `Arc`.
pub struct PluginRegistry {
    plugins: IndexMap<String, Arc<dyn Plugin>>,
    /// Alias -> internal name.
    aliases: HashMap<String, String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            plugins: IndexMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Registry holding every built-in plugin.
    pub fn with_builtins() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        builtin::register_all(&mut registry)?;
        info!("Registered {} built-in plugins", registry.len());
        Ok(registry)
    }

    /// Add a plugin. Its name and every alias must be unused by any other
    /// registered plugin.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Result<(), RegistryError> {
        let descriptor = plugin.descriptor();
        if descriptor.name.is_empty() {
            return Err(RegistryError::EmptyName);
        }

        let mut seen: Vec<&str> = Vec::new();
        for key in descriptor.keys() {
            if seen.contains(&key) {
                return Err(RegistryError::DuplicateName {
                    key: key.to_string(),
                    existing: descriptor.name.clone(),
                });
            }
            if let Some(existing) = self.resolve(key) {
                return Err(RegistryError::DuplicateName {
                    key: key.to_string(),
                    existing: existing.to_string(),
                });
            }
            seen.push(key);
        }

        let name = descriptor.name.clone();
        for alias in &descriptor.aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }
        debug!("Registered plugin '{}' ({})", name, descriptor.category);
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn register_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> Result<(), RegistryError> {
        self.register(Arc::new(plugin))
    }

    fn resolve<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if self.plugins.contains_key(key) {
            Some(key)
        } else {
            self.aliases.get(key).map(String::as_str)
        }
    }

    /// Look up by internal name or alias (exact, case-sensitive).
    pub fn lookup(&self, key: &str) -> Option<&Arc<dyn Plugin>> {
        self.resolve(key).and_then(|name| self.plugins.get(name))
    }

    /// Look up by display name. Display names are not required to be unique;
    /// the earliest registration wins.
    pub fn lookup_display(&self, display_name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins
            .values()
            .find(|p| p.descriptor().display_name == display_name)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// All plugins in registration order, optionally restricted to one category.
    pub fn list(&self, category: Option<Category>) -> Vec<&Arc<dyn Plugin>> {
        self.plugins
            .values()
            .filter(|p| category.is_none_or(|c| p.descriptor().category == c))
            .collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.plugins.values().map(|p| p.descriptor())
    }

    /// Plugins whose prerequisites are currently met, in registration order.
    pub fn filter_available(&self) -> Vec<&Arc<dyn Plugin>> {
        self.plugins
            .values()
            .filter(|p| p.prerequisites())
            .collect()
    }

    /// Drop every plugin for which `keep` returns false, along with its
    /// aliases. Returns the number removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&PluginDescriptor) -> bool,
    {
        let before = self.plugins.len();
        self.plugins.retain(|_, p| keep(p.descriptor()));
        let plugins = &self.plugins;
        self.aliases.retain(|_, name| plugins.contains_key(name.as_str()));
        let removed = before - self.plugins.len();
        if removed > 0 {
            debug!("Removed {} plugins from registry", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
