use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Codec,
    Compression,
    Hash,
    Formatter,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Codec,
        Self::Compression,
        Self::Hash,
        Self::Formatter,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Codec => "codec",
            Self::Compression => "compression",
            Self::Hash => "hash",
            Self::Formatter => "formatter",
            Self::Other => "other",
        }
    }

    /// Categories whose members normally come with an inverse operation.
    pub fn is_reversible_kind(&self) -> bool {
        matches!(self, Self::Codec | Self::Compression)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown plugin category: {s}"))
    }
}

/// Which side of a plugin a stage runs: `process` or `unprocess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Forward => "process",
            Self::Reverse => "unprocess",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Reverse => f.write_str("reverse"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "f" | "process" => Ok(Self::Forward),
            "reverse" | "r" | "unprocess" | "revert" => Ok(Self::Reverse),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Immutable metadata describing one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique registry key.
    pub name: String,
    pub display_name: String,
    /// Alternate lookup keys; unique across the whole registry.
    pub aliases: Vec<String>,
    pub category: Category,
    /// Whether `unprocess` is implemented.
    pub reversible: bool,
    pub help: String,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            aliases: Vec::new(),
            category,
            reversible: category.is_reversible_kind(),
            help: String::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn reversible(mut self, reversible: bool) -> Self {
        self.reversible = reversible;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// The name followed by every alias.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn matches(&self, key: &str) -> bool {
        self.keys().any(|k| k == key)
    }
}
