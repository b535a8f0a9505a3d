use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Text encodings a buffer can be declared to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("character {ch:?} cannot be represented in {encoding}")]
    Unrepresentable { encoding: Encoding, ch: char },
    #[error("bytes are not valid {encoding} (first invalid byte at offset {offset})")]
    InvalidBytes { encoding: Encoding, offset: usize },
    #[error("unknown encoding: {0}")]
    Unknown(String),
}

impl Encoding {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Ascii => "ascii",
            Self::Latin1 => "latin-1",
        }
    }

    /// Encode `text` into bytes, failing on the first character this encoding cannot hold.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Ascii => text
                .chars()
                .map(|ch| {
                    if ch.is_ascii() {
                        Ok(ch as u8)
                    } else {
                        Err(EncodingError::Unrepresentable { encoding: *self, ch })
                    }
                })
                .collect(),
            Self::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch))
                        .map_err(|_| EncodingError::Unrepresentable { encoding: *self, ch })
                })
                .collect(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, EncodingError> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| EncodingError::InvalidBytes {
                    encoding: *self,
                    offset: e.valid_up_to(),
                }),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(EncodingError::InvalidBytes {
                    encoding: *self,
                    offset,
                }),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
            // Every byte maps onto U+0000..U+00FF.
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Encoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            other => Err(EncodingError::Unknown(other.to_string())),
        }
    }
}
