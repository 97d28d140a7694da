//! Format detection and handler trait

use crate::error::Result;
use crate::node::Node;
use std::fmt;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Detect format from a file path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts between document text and the [`Node`] tree for one format
pub trait FormatHandler: Send + Sync {
    /// Get the format this handler processes
    fn format(&self) -> Format;

    /// Parse text into a document tree
    fn parse(&self, source: &str) -> Result<Node>;

    /// Render a document tree to text
    fn render(&self, node: &Node) -> Result<String>;

    /// Render a document tree in the layout of `original`, keeping what the
    /// format can carry over (comments, key order, spacing).
    ///
    /// Handlers without a layout-preserving mode render from scratch.
    fn render_onto(&self, original: &str, node: &Node) -> Result<String> {
        let _ = original;
        self.render(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yaml", Some(Format::Yaml))]
    #[case("YML", Some(Format::Yaml))]
    #[case("json", Some(Format::Json))]
    #[case("toml", Some(Format::Toml))]
    #[case("md", None)]
    fn test_from_extension(#[case] ext: &str, #[case] expected: Option<Format>) {
        assert_eq!(Format::from_extension(ext), expected);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            Format::from_path(Path::new("/etc/app/defaults.yml")),
            Some(Format::Yaml)
        );
        assert_eq!(Format::from_path(Path::new("no_extension")), None);
    }
}
