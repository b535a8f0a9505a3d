use crate::error::{PluginError, Result};
use crate::plugin_trait::Plugin;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use deen_domain::{Category, PluginDescriptor};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode, percent_encode};

fn strip_ascii_whitespace(data: &[u8]) -> Vec<u8> {
    data.iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect()
}

pub struct Base64Codec {
    descriptor: PluginDescriptor,
}

impl Base64Codec {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("base64", "Base64", Category::Codec)
                .alias("b64")
                .help("Base64 encode/decode data"),
        }
    }
}

impl Default for Base64Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Base64Codec {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(STANDARD.encode(data).into_bytes())
    }

    fn unprocess(&self, data: &[u8]) -> Result<Vec<u8>> {
        STANDARD
            .decode(strip_ascii_whitespace(data))
            .map_err(|e| PluginError::format(self.name(), e))
    }
}

pub struct Base64UrlCodec {
    descriptor: PluginDescriptor,
}

impl Base64UrlCodec {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("base64_url", "Base64 URL", Category::Codec)
                .alias("b64url")
                .help("URL-safe Base64 encode/decode data"),
        }
    }
}

impl Default for Base64UrlCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Base64UrlCodec {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(URL_SAFE.encode(data).into_bytes())
    }

    fn unprocess(&self, data: &[u8]) -> Result<Vec<u8>> {
        URL_SAFE
            .decode(strip_ascii_whitespace(data))
            .map_err(|e| PluginError::format(self.name(), e))
    }
}

pub struct HexCodec {
    descriptor: PluginDescriptor,
}

impl HexCodec {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("hex", "Hex", Category::Codec)
                .alias("hexlify")
                .help("Hex encode/decode data"),
        }
    }
}

impl Default for HexCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for HexCodec {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(hex::encode(data).into_bytes())
    }

    fn unprocess(&self, data: &[u8]) -> Result<Vec<u8>> {
        hex::decode(strip_ascii_whitespace(data)).map_err(|e| PluginError::format(self.name(), e))
    }
}

/// Everything except RFC 3986 unreserved characters is escaped.
const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub struct UrlCodec {
    descriptor: PluginDescriptor,
}

impl UrlCodec {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("url", "URL", Category::Codec)
                .alias("urlencode")
                .help("URL (percent) encode/decode data"),
        }
    }
}

impl Default for UrlCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for UrlCodec {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(percent_encode(data, URL_ESCAPE).to_string().into_bytes())
    }

    fn unprocess(&self, data: &[u8]) -> Result<Vec<u8>> {
        // percent_decode passes broken escapes through verbatim; reject them instead.
        let mut i = 0;
        while i < data.len() {
            if data[i] == b'%' {
                let escape = data.get(i + 1..i + 3);
                if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
                    return Err(PluginError::format(
                        self.name(),
                        format!("invalid percent escape at offset {i}"),
                    ));
                }
                i += 3;
            } else {
                i += 1;
            }
        }
        Ok(percent_decode(data).collect())
    }
}
