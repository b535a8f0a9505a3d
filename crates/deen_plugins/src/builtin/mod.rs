//! Plugins shipped with deen-rs.
//!
//! There is no runtime discovery: every built-in is listed in
//! [`register_all`], which runs once before the registry is handed out.

pub mod codecs;
pub mod compressions;
pub mod formatters;
pub mod hashes;

use crate::error::RegistryError;
use crate::registry::PluginRegistry;

pub use codecs::{Base64Codec, Base64UrlCodec, HexCodec, UrlCodec};
pub use compressions::{Container, FlateCodec};
pub use formatters::{JsonFormatter, JsonMinify};
pub use hashes::DigestPlugin;

pub fn register_all(registry: &mut PluginRegistry) -> Result<(), RegistryError> {
    // Codecs
    registry.register_plugin(Base64Codec::new())?;
    registry.register_plugin(Base64UrlCodec::new())?;
    registry.register_plugin(HexCodec::new())?;
    registry.register_plugin(UrlCodec::new())?;

    // Compressions
    registry.register_plugin(compressions::zlib())?;
    registry.register_plugin(compressions::gzip())?;
    registry.register_plugin(compressions::deflate())?;

    // Hashes
    registry.register_plugin(hashes::sha1())?;
    registry.register_plugin(hashes::sha256())?;
    registry.register_plugin(hashes::sha512())?;

    // Formatters
    registry.register_plugin(JsonFormatter::new())?;
    registry.register_plugin(JsonMinify::new())?;

    Ok(())
}
