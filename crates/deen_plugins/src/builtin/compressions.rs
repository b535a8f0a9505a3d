use crate::error::{PluginError, Result};
use crate::plugin_trait::Plugin;
use deen_domain::{Category, PluginDescriptor};
use flate2::read::GzDecoder;
use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::{self, Read, Write};

/// Framing around the DEFLATE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// RFC 1950: two-byte header, Adler-32 trailer.
    Zlib,
    /// RFC 1952: gzip member with CRC-32 trailer.
    Gzip,
    /// RFC 1951: bare DEFLATE blocks.
    Raw,
}

/// Compressor backed by `flate2` at the default compression level.
pub struct FlateCodec {
    descriptor: PluginDescriptor,
    container: Container,
}

impl FlateCodec {
    pub fn new(descriptor: PluginDescriptor, container: Container) -> Self {
        Self {
            descriptor,
            container,
        }
    }

    pub fn container(&self) -> Container {
        self.container
    }

    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let out = Vec::with_capacity(data.len() / 2 + 32);
        match self.container {
            Container::Zlib => {
                let mut encoder = ZlibEncoder::new(out, Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Container::Gzip => {
                let mut encoder = GzEncoder::new(out, Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Container::Raw => {
                let mut encoder = DeflateEncoder::new(out, Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self.container {
            Container::Zlib => inflate(data, true),
            Container::Raw => inflate(data, false),
            // The gzip trailer check rejects truncated members.
            Container::Gzip => {
                let mut out = Vec::with_capacity(data.len() * 2);
                GzDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

/// Inflate a whole zlib or raw stream; running out of input before the
/// final block is an error rather than a short result.
fn inflate(data: &[u8], zlib_header: bool) -> io::Result<Vec<u8>> {
    let mut inflater = Decompress::new(zlib_header);
    let mut out = Vec::with_capacity(data.len() * 2 + 64);
    loop {
        let consumed = usize::try_from(inflater.total_in()).unwrap_or(data.len()).min(data.len());
        let status = inflater
            .decompress_vec(&data[consumed..], &mut out, FlushDecompress::Finish)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match status {
            Status::StreamEnd => return Ok(out),
            Status::Ok | Status::BufError if out.len() == out.capacity() => {
                out.reserve(out.capacity());
            }
            Status::Ok | Status::BufError => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "compressed stream ends before its final block",
                ));
            }
        }
    }
}

impl Plugin for FlateCodec {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.compress(data)
            .map_err(|e| PluginError::format(self.name(), e))
    }

    fn unprocess(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decompress(data)
            .map_err(|e| PluginError::format(self.name(), e))
    }
}

pub fn zlib() -> FlateCodec {
    FlateCodec::new(
        PluginDescriptor::new("zlib", "ZLIB", Category::Compression).help("ZLIB compress/decompress data"),
        Container::Zlib,
    )
}

pub fn gzip() -> FlateCodec {
    FlateCodec::new(
        PluginDescriptor::new("gzip", "GZIP", Category::Compression)
            .alias("gz")
            .help("GZIP compress/decompress data"),
        Container::Gzip,
    )
}

pub fn deflate() -> FlateCodec {
    FlateCodec::new(
        PluginDescriptor::new("deflate", "Deflate", Category::Compression)
            .help("Raw DEFLATE compress/decompress data"),
        Container::Raw,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deen_domain::Direction;

    fn sample() -> Vec<u8> {
        b"deen deen deen deen deen deen deen deen".repeat(16)
    }

    #[test]
    fn test_compressors_are_reversible() {
        for plugin in [zlib(), gzip(), deflate()] {
            assert_eq!(plugin.descriptor().category, Category::Compression);
            assert!(plugin.descriptor().reversible);

            let packed = plugin.apply(Direction::Forward, &sample()).unwrap();
            assert!(packed.len() < sample().len(), "{} did not shrink", plugin.name());
            assert_eq!(plugin.apply(Direction::Reverse, &packed).unwrap(), sample());
        }
    }

    #[test]
    fn test_container_framing() {
        let zlib_out = zlib().process(b"x").unwrap();
        assert_eq!(zlib_out[0], 0x78);

        let gzip_out = gzip().process(b"x").unwrap();
        assert_eq!(&gzip_out[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_uncompressed_input_is_format_error() {
        for codec in [zlib(), gzip()] {
            let err = codec.unprocess(b"not compressed").unwrap_err();
            assert!(
                matches!(err, PluginError::Format { ref plugin, .. } if plugin == codec.name()),
                "{err:?}"
            );
        }
        // BFINAL set with the reserved block type 0b11.
        assert!(matches!(
            deflate().unprocess(&[0x07]),
            Err(PluginError::Format { .. })
        ));
    }

    #[test]
    fn test_truncated_stream_is_format_error() {
        for codec in [zlib(), gzip(), deflate()] {
            let packed = codec.process(&sample()).unwrap();
            let err = codec.unprocess(&packed[..packed.len() / 2]).unwrap_err();
            assert!(matches!(err, PluginError::Format { .. }), "{}", codec.name());
        }
    }

    #[test]
    fn test_output_larger_than_initial_buffer() {
        let big = vec![b'a'; 1 << 20];
        let packed = deflate().process(&big).unwrap();
        assert_eq!(deflate().unprocess(&packed).unwrap(), big);
    }

    #[test]
    fn test_checksum_mismatch_is_format_error() {
        let mut packed = gzip().process(&sample()).unwrap();
        let crc_at = packed.len() - 8;
        packed[crc_at] ^= 0xff;

        let err = gzip().unprocess(&packed).unwrap_err();
        assert!(matches!(err, PluginError::Format { ref plugin, .. } if plugin == "gzip"));
    }
}
