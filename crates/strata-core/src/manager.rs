//! Configuration manager
//!
//! [`ConfigManager`] ties the pieces together: it compiles the default
//! document, seeds a [`ConfigOverlay`] with its defaults, stacks optional
//! files on top, and applies environment and command-line overrides through
//! the [`FlatKeyMap`].
//!
//! Environment overrides are strict: one unknown key aborts the whole batch.
//! Command-line overrides are lenient: unknown options are dropped, since the
//! same argument list usually carries the host program's own flags.

use std::io::Write;
use std::path::{Path, PathBuf};

use strata_doc::io::read_text;
use strata_doc::{DocumentCodec, Format, Node};
use strata_schema::{CompiledSchema, SchemaCompiler, SchemaExporter};
use tracing::{debug, info, warn};

use crate::cli_args::parse_cli_args;
use crate::error::{Error, Result};
use crate::flat_index::{FlatKeyMap, KeyStyle};
use crate::overlay::ConfigOverlay;

/// Where configuration comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Annotated default document; its absence disables export
    pub default_file: Option<PathBuf>,
    /// Overlay files loaded in order; missing ones are skipped with a warning
    pub optional_files: Vec<PathBuf>,
    /// Prefix of environment variable names
    pub env_prefix: String,
}

impl ManagerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_file = Some(path.into());
        self
    }

    pub fn with_optional_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.optional_files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }
}

/// The annotated default document, kept for export
#[derive(Debug)]
struct Template {
    exporter: SchemaExporter,
    /// Original text, so exports keep its comments and layout
    source: String,
}

/// Resolves layered configuration against a compiled schema
#[derive(Debug)]
pub struct ConfigManager {
    options: ManagerOptions,
    codec: DocumentCodec,
    schema: CompiledSchema,
    template: Option<Template>,
    keys: FlatKeyMap,
    overlay: ConfigOverlay,
    format: Format,
}

impl ConfigManager {
    /// Create a manager reading documents with the default codec
    pub fn new(options: ManagerOptions) -> Result<Self> {
        Self::with_codec(options, DocumentCodec::new())
    }

    /// Create a manager with an explicit codec
    ///
    /// # Errors
    ///
    /// Fails when the default file cannot be read, parsed or compiled, or
    /// when an optional file exists but is malformed.
    pub fn with_codec(options: ManagerOptions, codec: DocumentCodec) -> Result<Self> {
        let (schema, template, format) = match &options.default_file {
            Some(path) => {
                info!(path = %path.display(), "loading default configuration");
                let format = codec.format_for(path);
                let source = read_text(path)?;
                let document = codec.parse(&source, format)?;
                let schema = SchemaCompiler::new().compile(&document)?;
                let template = Template {
                    exporter: SchemaExporter::new(document),
                    source,
                };
                (schema, Some(template), format)
            }
            None => (CompiledSchema::empty(), None, codec.fallback()),
        };

        let keys = FlatKeyMap::new(schema.flat.clone(), options.env_prefix.clone());
        let overlay = ConfigOverlay::new(schema.defaults.clone());

        let mut manager = Self {
            options,
            codec,
            schema,
            template,
            keys,
            overlay,
            format,
        };

        let optional_files = manager.options.optional_files.clone();
        for path in &optional_files {
            manager.load_optional(path)?;
        }

        Ok(manager)
    }

    fn load_optional(&mut self, path: &Path) -> Result<()> {
        match self.codec.load(path) {
            Ok(document) => {
                info!(path = %path.display(), "loaded optional configuration");
                self.push_layer(document, &path.display().to_string())
            }
            Err(strata_doc::Error::FileAccess { .. }) => {
                warn!("Optional config file at {} not found.", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn push_layer(&mut self, layer: Node, source_name: &str) -> Result<()> {
        match layer {
            Node::Mapping(_) => self.overlay.push(layer),
            node if node.is_null() => self.overlay.push(Node::empty_mapping()),
            other => {
                return Err(Error::InvalidLayer {
                    source_name: source_name.to_string(),
                    found: other.kind_name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// The resolved configuration
    pub fn config(&self) -> Node {
        self.overlay.resolve()
    }

    pub fn overlay(&self) -> &ConfigOverlay {
        &self.overlay
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    pub fn defaults(&self) -> &Node {
        &self.schema.defaults
    }

    pub fn descriptions(&self) -> &Node {
        &self.schema.descriptions
    }

    pub fn keys(&self) -> &FlatKeyMap {
        &self.keys
    }

    pub fn has_defaults(&self) -> bool {
        self.options.default_file.is_some()
    }

    pub fn default_file(&self) -> Option<&Path> {
        self.options.default_file.as_deref()
    }

    pub fn optional_files(&self) -> &[PathBuf] {
        &self.options.optional_files
    }

    /// Format used when exporting, taken from the default file's extension
    pub fn format(&self) -> Format {
        self.format
    }

    /// Validate the resolved configuration against the compiled schema
    pub fn validate(&self) -> Result<()> {
        let report = self.schema.validator().validate(&self.config());
        if report.is_valid() {
            debug!("configuration is valid");
            Ok(())
        } else {
            Err(Error::Validation { report })
        }
    }

    fn template(&self) -> Result<&Template> {
        self.template.as_ref().ok_or(Error::MissingDefaults)
    }

    /// Write the defaults, without annotations, in the default file's shape
    pub fn generate_config_example(&self, out: &mut dyn Write) -> Result<()> {
        let template = self.template()?;
        let example = template.exporter.example();
        self.codec
            .dump_onto(&template.source, &example, self.format, out)?;
        Ok(())
    }

    /// Write the resolved configuration in the default file's shape.
    ///
    /// Comments of the default file are kept as far as its format allows;
    /// list elements beyond the template's own are written plain.
    pub fn export_current_config(&self, out: &mut dyn Write) -> Result<()> {
        let template = self.template()?;
        let exported = template.exporter.export(&self.config());
        self.codec
            .dump_onto(&template.source, &exported, self.format, out)?;
        Ok(())
    }

    pub fn get_cli_opt_value(&self, key: &str) -> Result<Node> {
        self.get_value(KeyStyle::Cli, key)
    }

    pub fn get_env_var_value(&self, key: &str) -> Result<Node> {
        self.get_value(KeyStyle::Env, key)
    }

    fn get_value(&self, style: KeyStyle, key: &str) -> Result<Node> {
        let entry = self.keys.resolve(style, key)?;
        self.overlay
            .get(&entry.path)
            .ok_or_else(|| Error::UnknownPath {
                key: key.to_string(),
            })
    }

    /// Override one value, addressed by its CLI key, in a new layer
    pub fn set_cli_opt_value(&mut self, key: &str, value: impl Into<Node>) -> Result<()> {
        self.set_value(KeyStyle::Cli, key, value.into())
    }

    /// Override one value, addressed by its environment key, in a new layer
    pub fn set_env_var_value(&mut self, key: &str, value: impl Into<Node>) -> Result<()> {
        self.set_value(KeyStyle::Env, key, value.into())
    }

    fn set_value(&mut self, style: KeyStyle, key: &str, value: Node) -> Result<()> {
        let keys = &self.keys;
        self.overlay
            .merge([(key, value)], |writer, (key, value)| {
                keys.set(writer, style, key, value)
            })
    }

    /// Apply environment overrides as one layer.
    ///
    /// Every key must resolve; otherwise nothing is applied.
    pub fn merge_env_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Node>,
    {
        let keys = &self.keys;
        self.overlay.merge(vars, |writer, (key, value)| {
            debug!(key = key.as_ref(), "applying environment override");
            keys.set(writer, KeyStyle::Env, key.as_ref(), value.into())
        })
    }

    /// Apply command-line overrides as one layer, dropping unknown options.
    pub fn merge_cli_opts<I, K, V>(&mut self, opts: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Node>,
    {
        let keys = &self.keys;
        let known: Vec<(K, V)> = opts
            .into_iter()
            .filter(|(key, _)| {
                let known = keys.is_known_cli_opt(key.as_ref());
                if !known {
                    debug!(key = key.as_ref(), "ignoring unknown command-line option");
                }
                known
            })
            .collect();

        self.overlay.merge(known, |writer, (key, value)| {
            keys.set(writer, KeyStyle::Cli, key.as_ref(), value.into())
        })
    }

    /// Apply every process environment variable carrying the prefix.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn config_from_env_vars(&mut self) -> Result<()> {
        let vars = std::env::vars_os().filter_map(|(name, value)| {
            match (name.into_string(), value.into_string()) {
                (Ok(name), Ok(value)) => Some((name, value)),
                (name, _) => {
                    debug!(
                        name = %name.unwrap_or_else(|raw| raw.to_string_lossy().into_owned()),
                        "skipping environment variable that is not UTF-8"
                    );
                    None
                }
            }
        });
        self.config_from_vars(vars)
    }

    /// Apply the variables of `vars` that carry the prefix
    pub fn config_from_vars<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Node>,
    {
        let prefixed: Vec<(K, V)> = vars
            .into_iter()
            .filter(|(key, _)| self.keys.is_prefixed(key.as_ref()))
            .collect();
        self.merge_env_vars(prefixed)
    }

    pub fn config_from_cli_opts<I, K, V>(&mut self, opts: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Node>,
    {
        self.merge_cli_opts(opts)
    }

    /// Tokenize raw arguments and apply the options they carry
    pub fn config_from_cli_args<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.merge_cli_opts(parse_cli_args(args))
    }

    /// Load a file as a new layer; unlike optional files, it must exist
    pub fn config_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration file");
        let document = self.codec.load(path)?;
        self.push_layer(document, &path.display().to_string())
    }

    /// Push an in-memory tree as a new layer
    pub fn config_from_node(&mut self, node: Node) -> Result<()> {
        self.push_layer(node, "in-memory configuration")
    }
}
