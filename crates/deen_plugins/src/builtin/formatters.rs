use crate::error::{PluginError, Result};
use crate::plugin_trait::Plugin;
use deen_domain::{Category, PluginDescriptor};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io::{self, Write};

/// Rebuild every object with its keys inserted in sorted order, whatever map
/// backing serde_json was compiled with.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Numbers keep their literal text (`arbitrary_precision`), so integers
/// wider than 64 bits survive unchanged.
fn parse(plugin: &str, data: &[u8]) -> Result<Value> {
    serde_json::from_slice::<Value>(data)
        .map(sort_keys)
        .map_err(|e| PluginError::format(plugin, e))
}

/// Wraps another formatter and escapes everything outside printable ASCII
/// as `\uXXXX`, using surrogate pairs above the BMP.
struct AsciiOnly<F>(F);

impl<F: Formatter> Formatter for AsciiOnly<F> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

fn render<F: Formatter>(plugin: &str, value: &Value, formatter: F, capacity: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(capacity);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiOnly(formatter));
    value
        .serialize(&mut serializer)
        .map_err(|e| PluginError::format(plugin, e))?;
    Ok(out)
}

/// Pretty-prints JSON with sorted keys and a four-space indent.
pub struct JsonFormatter {
    descriptor: PluginDescriptor,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("json_formatter", "JSON (f)", Category::Formatter)
                .alias("json-format")
                .help("Reformat JSON data"),
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for JsonFormatter {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        let value = parse(self.name(), data)?;
        render(self.name(), &value, PrettyFormatter::with_indent(b"    "), data.len())
    }
}

/// Compact JSON with sorted keys.
pub struct JsonMinify {
    descriptor: PluginDescriptor,
}

impl JsonMinify {
    pub fn new() -> Self {
        Self {
            descriptor: PluginDescriptor::new("json_minify", "JSON (min)", Category::Formatter)
                .alias("json-min")
                .help("Minify JSON data"),
        }
    }
}

impl Default for JsonMinify {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for JsonMinify {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn process(&self, data: &[u8]) -> Result<Vec<u8>> {
        let value = parse(self.name(), data)?;
        render(self.name(), &value, CompactFormatter, data.len())
    }
}
