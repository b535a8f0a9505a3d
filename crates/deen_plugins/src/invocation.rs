use crate::error::PluginError;
use crate::plugin_trait::Plugin;
use deen_domain::{Buffer, Direction, Encoding, EncodingError};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File argument meaning "read standard input".
pub const STDIN_MARKER: &str = "-";

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not representable: {0}")]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Per-plugin command line arguments.
#[derive(Debug, Clone, Default)]
pub struct InputArgs {
    /// Positional input data.
    pub data: Option<String>,
    /// File to read, or `-` for stdin.
    pub file: Option<PathBuf>,
    /// Run `unprocess` instead of `process`.
    pub revert: bool,
}

impl InputArgs {
    pub fn direction(&self) -> Direction {
        if self.revert {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Input named by the arguments alone: positional data, then the file
    /// flag (stdin when absent). Positional text is converted with `encoding`.
    pub fn read_input<R: Read>(&self, encoding: Encoding, stdin: R) -> Result<Buffer, InvocationError> {
        if let Some(data) = self.data.as_deref().filter(|d| !d.is_empty()) {
            return Ok(Buffer::from_text(data, encoding)?);
        }
        let stdin_marker = PathBuf::from(STDIN_MARKER);
        let path = self.file.as_ref().unwrap_or(&stdin_marker);
        read_content_from_file(path, stdin)
    }
}

/// Read a whole file, or `stdin` when `path` is `-`.
pub fn read_content_from_file<R: Read>(path: &Path, mut stdin: R) -> Result<Buffer, InvocationError> {
    let mut content = Vec::new();
    let result = if path == Path::new(STDIN_MARKER) {
        stdin.read_to_end(&mut content)
    } else {
        File::open(path).and_then(|mut f| f.read_to_end(&mut content))
    };
    result.map_err(|source| InvocationError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(Buffer::from(content))
}

/// One command line application of a plugin.
pub struct Invocation<'p> {
    plugin: &'p dyn Plugin,
    content: Option<Buffer>,
    encoding: Encoding,
}

impl<'p> Invocation<'p> {
    pub fn new(plugin: &'p dyn Plugin) -> Self {
        Self {
            plugin,
            content: None,
            encoding: Encoding::Utf8,
        }
    }

    /// In-memory content; takes precedence over every argument when non-empty.
    pub fn with_content(mut self, content: Buffer) -> Self {
        self.content = Some(content);
        self
    }

    /// Encoding used to turn positional text into bytes.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Effective input: in-memory content, then positional data, then the
    /// file flag (stdin when absent).
    pub fn resolve_content<R: Read>(
        &self,
        args: &InputArgs,
        stdin: R,
    ) -> Result<Buffer, InvocationError> {
        if let Some(content) = self.content.as_ref().filter(|c| !c.is_empty()) {
            return Ok(content.clone());
        }
        args.read_input(self.encoding, stdin)
    }

    /// Resolve input and apply the plugin. `Ok(None)` means there was no
    /// input to work on.
    pub fn run<R: Read>(
        self,
        args: &InputArgs,
        stdin: R,
    ) -> Result<Option<Buffer>, InvocationError> {
        let content = self.resolve_content(args, stdin)?;
        if content.is_empty() {
            debug!("No input for {}, nothing to do", self.plugin.name());
            return Ok(None);
        }
        let output = self.plugin.apply(args.direction(), content.as_bytes())?;
        Ok(Some(Buffer::from(output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{HexCodec, JsonFormatter};
    use std::io::{Cursor, Write};

    fn no_stdin() -> Cursor<Vec<u8>> {
        Cursor::new(Vec::new())
    }

    #[test]
    fn test_explicit_content_wins() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            data: Some("positional".to_string()),
            ..Default::default()
        };
        let invocation = Invocation::new(&plugin).with_content(Buffer::from(b"memory"));
        let content = invocation.resolve_content(&args, no_stdin()).unwrap();
        assert_eq!(content.as_bytes(), b"memory");
    }

    #[test]
    fn test_positional_beats_file() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            data: Some("positional".to_string()),
            file: Some(PathBuf::from("/definitely/not/here")),
            revert: false,
        };
        let content = Invocation::new(&plugin)
            .resolve_content(&args, no_stdin())
            .unwrap();
        assert_eq!(content.as_bytes(), b"positional");
    }

    #[test]
    fn test_empty_content_falls_through_to_positional() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            data: Some("abc".to_string()),
            ..Default::default()
        };
        let content = Invocation::new(&plugin)
            .with_content(Buffer::new())
            .resolve_content(&args, no_stdin())
            .unwrap();
        assert_eq!(content.as_bytes(), b"abc");
    }

    #[test]
    fn test_read_input_without_plugin() {
        let args = InputArgs {
            data: Some("abc".to_string()),
            file: Some(PathBuf::from("/definitely/not/here")),
            revert: true,
        };
        let content = args.read_input(Encoding::Utf8, no_stdin()).unwrap();
        assert_eq!(content.as_bytes(), b"abc");

        let from_stdin = InputArgs::default()
            .read_input(Encoding::Utf8, Cursor::new(b"piped".to_vec()))
            .unwrap();
        assert_eq!(from_stdin.as_bytes(), b"piped");
    }

    #[test]
    fn test_defaults_to_stdin() {
        let plugin = HexCodec::new();
        let output = Invocation::new(&plugin)
            .run(&InputArgs::default(), Cursor::new(b"hi".to_vec()))
            .unwrap()
            .unwrap();
        assert_eq!(output.as_bytes(), b"6869");
    }

    #[test]
    fn test_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"b":1,"a":2}"#).unwrap();

        let plugin = JsonFormatter::new();
        let args = InputArgs {
            file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let output = Invocation::new(&plugin)
            .run(&args, no_stdin())
            .unwrap()
            .unwrap();
        assert_eq!(output.as_bytes(), b"{\n    \"a\": 2,\n    \"b\": 1\n}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            file: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        let err = Invocation::new(&plugin).run(&args, no_stdin()).unwrap_err();
        assert!(matches!(err, InvocationError::Io { .. }));
    }

    #[test]
    fn test_revert_runs_unprocess() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            data: Some("6869".to_string()),
            revert: true,
            ..Default::default()
        };
        let output = Invocation::new(&plugin)
            .run(&args, no_stdin())
            .unwrap()
            .unwrap();
        assert_eq!(output.as_bytes(), b"hi");
    }

    #[test]
    fn test_empty_input_is_nothing_to_do() {
        let plugin = HexCodec::new();
        let output = Invocation::new(&plugin)
            .run(&InputArgs::default(), no_stdin())
            .unwrap();
        assert!(output.is_none());
    }

    #[test]
    fn test_positional_text_uses_declared_encoding() {
        let plugin = HexCodec::new();
        let args = InputArgs {
            data: Some("\u{e9}".to_string()),
            ..Default::default()
        };
        let latin1 = Invocation::new(&plugin)
            .with_encoding(Encoding::Latin1)
            .run(&args, no_stdin())
            .unwrap()
            .unwrap();
        assert_eq!(latin1.as_bytes(), b"e9");

        let ascii = Invocation::new(&plugin)
            .with_encoding(Encoding::Ascii)
            .run(&args, no_stdin());
        assert!(matches!(ascii, Err(InvocationError::Encoding(_))));
    }

    #[test]
    fn test_plugin_failure_is_reported() {
        let plugin = JsonFormatter::new();
        let args = InputArgs {
            data: Some("{bad json".to_string()),
            ..Default::default()
        };
        let err = Invocation::new(&plugin).run(&args, no_stdin()).unwrap_err();
        assert!(matches!(err, InvocationError::Plugin(PluginError::Format { .. })));
    }
}
