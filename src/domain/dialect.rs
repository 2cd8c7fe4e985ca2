/// Input Dialect Module
///
/// Defines the input formats scriptscope can turn into a syntax tree.

use serde::Deserialize;
use std::path::Path;

/// How the input text is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// JavaScript source text.
    #[serde(alias = "javascript")]
    Js,
    /// An ESTree syntax tree serialized as JSON (esprima, acorn, ...).
    #[serde(alias = "json")]
    Estree,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Js, Dialect::Estree];

    /// Parse dialect from string (CLI input).
    pub fn from_str(s: &str) -> Option<Dialect> {
        match s.to_lowercase().as_str() {
            "js" | "javascript" => Some(Dialect::Js),
            "estree" | "json" => Some(Dialect::Estree),
            _ => None,
        }
    }

    /// Infer dialect from file extension.
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        let ext = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.extensions().iter().any(|known| *known == ext))
    }

    /// Infer dialect from a file path.
    pub fn from_path(path: &Path) -> Option<Dialect> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Get the display name of the dialect.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Js => "JavaScript",
            Dialect::Estree => "ESTree JSON",
        }
    }

    /// Get the file extensions for this dialect.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Dialect::Js => &["js", "mjs", "cjs"],
            Dialect::Estree => &["json"],
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Js
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
