//! Loading and dumping documents by format

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::{Format, FormatHandler};
use crate::handlers::{JsonHandler, TomlHandler, YamlHandler};
use crate::io::read_text;
use crate::node::Node;

/// Picks a [`FormatHandler`] by file extension and reads or writes documents
///
/// Files whose extension is not recognised are treated as the fallback
/// format, YAML unless configured otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCodec {
    fallback: Format,
}

impl DocumentCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: Format) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Format {
        self.fallback
    }

    /// Format used for a path
    pub fn format_for(&self, path: &Path) -> Format {
        Format::from_path(path).unwrap_or(self.fallback)
    }

    /// Handler for a format
    pub fn handler(&self, format: Format) -> Box<dyn FormatHandler> {
        match format {
            Format::Yaml => Box::new(YamlHandler::new()),
            Format::Json => Box::new(JsonHandler::new()),
            Format::Toml => Box::new(TomlHandler::new()),
        }
    }

    /// Read and parse a document from disk
    pub fn load(&self, path: &Path) -> Result<Node> {
        let format = self.format_for(path);
        debug!(path = %path.display(), %format, "loading document");
        let source = read_text(path)?;
        self.parse(&source, format)
    }

    pub fn parse(&self, source: &str, format: Format) -> Result<Node> {
        self.handler(format).parse(source)
    }

    pub fn render(&self, node: &Node, format: Format) -> Result<String> {
        self.handler(format).render(node)
    }

    /// Render a document in the layout of the `original` text
    pub fn render_onto(&self, original: &str, node: &Node, format: Format) -> Result<String> {
        self.handler(format).render_onto(original, node)
    }

    /// Render a document into a writer
    pub fn dump(&self, node: &Node, format: Format, out: &mut dyn Write) -> Result<()> {
        let text = self.render(node, format)?;
        out.write_all(text.as_bytes()).map_err(Error::Io)?;
        Ok(())
    }

    /// Render a document in the layout of `original` into a writer
    pub fn dump_onto(
        &self,
        original: &str,
        node: &Node,
        format: Format,
        out: &mut dyn Write,
    ) -> Result<()> {
        let text = self.render_onto(original, node, format)?;
        out.write_all(text.as_bytes()).map_err(Error::Io)?;
        Ok(())
    }
}
