use crate::encoding::{Encoding, EncodingError};
use serde::{Deserialize, Serialize};

/// An owned byte sequence flowing between drivers and chain stages.
///
/// Text only becomes a `Buffer` through [`Buffer::from_text`] with an explicit
/// encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_text(text: &str, encoding: Encoding) -> Result<Self, EncodingError> {
        encoding.encode(text).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn decode(&self, encoding: Encoding) -> Result<String, EncodingError> {
        encoding.decode(&self.0)
    }

    /// Text for presentation. Bytes that do not decode under `encoding` are
    /// shown lossily and the view is flagged read-only.
    pub fn text_view(&self, encoding: Encoding) -> TextView {
        match self.decode(encoding) {
            Ok(text) => TextView {
                text,
                encoding,
                read_only: false,
            },
            Err(_) => TextView {
                text: String::from_utf8_lossy(&self.0).into_owned(),
                encoding,
                read_only: true,
            },
        }
    }

    pub fn inferred_text_view(&self) -> TextView {
        self.text_view(Encoding::Utf8)
    }

    /// Printable ASCII rendering: graphic characters and space are kept,
    /// everything else becomes `.`.
    pub fn printable_ascii(&self) -> String {
        self.0
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Buffer {
    fn from(bytes: &[u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Buffer> for Vec<u8> {
    fn from(buffer: Buffer) -> Self {
        buffer.0
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
    pub text: String,
    pub encoding: Encoding,
    pub read_only: bool,
}
