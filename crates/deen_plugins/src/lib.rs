//! # deen plugins
//!
//! The plugin contract for deen-rs and the registry drivers use to find
//! plugins, plus the built-in encoders, decoders, hashes and formatters.
//!
//! ## Features
//!
//! - **Uniform contract**: every plugin maps bytes to bytes through
//!   `process`, and optionally back through `unprocess`
//! - **Capability metadata**: reversibility is declared up front in the
//!   [`PluginDescriptor`](deen_domain::PluginDescriptor)
//! - **Static registration**: built-ins are registered explicitly at startup,
//!   names and aliases are checked for collisions
//!
//! ## Example
//!
//! ```rust
//! use deen_domain::Direction;
//! use deen_plugins::PluginRegistry;
//!
//! let registry = PluginRegistry::with_builtins().unwrap();
//! let hex = registry.lookup("hex").unwrap();
//!
//! let encoded = hex.apply(Direction::Forward, b"hi").unwrap();
//! assert_eq!(encoded, b"6869");
//! assert_eq!(hex.apply(Direction::Reverse, &encoded).unwrap(), b"hi");
//! ```
//!
//! ## Writing a plugin
//!
//! Implement [`Plugin`] and register it:
//!
//! ```rust
//! use deen_domain::{Category, PluginDescriptor};
//! use deen_plugins::{Plugin, PluginRegistry, Result};
//!
//! struct Reverse(PluginDescriptor);
//!
//! impl Plugin for Reverse {
//!     fn descriptor(&self) -> &PluginDescriptor {
//!         &self.0
//!     }
//!
//!     fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
//!         Ok(data.iter().rev().copied().collect())
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry
//!     .register_plugin(Reverse(PluginDescriptor::new("reverse", "Reverse", Category::Other)))
//!     .unwrap();
//! assert!(registry.contains("reverse"));
//! ```

pub mod builtin;
pub mod error;
pub mod invocation;
pub mod plugin_trait;
pub mod registry;

// Re-export main types
pub use error::{PluginError, RegistryError, Result};
pub use invocation::{InputArgs, Invocation, InvocationError, STDIN_MARKER};
pub use plugin_trait::Plugin;
pub use registry::PluginRegistry;
