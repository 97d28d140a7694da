//! Schema compilation, validation and export for strata
//!
//! An annotated default document is compiled into a validation schema, a
//! tree of default values and a flat index of every value and list path.
//! Metadata keys (`oc_schema`, `oc_schema_id`, `oc_desc`, `oc_default`)
//! annotate the document without being part of the configuration.
//!
//! ```
//! use strata_doc::{DocumentCodec, Format};
//! use strata_schema::SchemaCompiler;
//!
//! let doc = DocumentCodec::new()
//!     .parse("ui:\n  port:\n    oc_default: 8080\n    oc_schema: {type: integer}\n", Format::Yaml)
//!     .unwrap();
//! let compiled = SchemaCompiler::new().compile(&doc).unwrap();
//! assert_eq!(compiled.defaults.get("ui").and_then(|ui| ui.get("port")).and_then(|p| p.as_i64()), Some(8080));
//! assert!(compiled.validator().validate(&compiled.defaults).is_valid());
//! ```

pub mod compiler;
pub mod error;
pub mod exporter;
pub mod flat;
pub mod registry;
pub mod rule;
pub mod token;
pub mod types;
pub mod validator;

pub use compiler::{CompiledSchema, SchemaCompiler};
pub use error::{Error, Result};
pub use exporter::SchemaExporter;
pub use flat::{FlatPath, FlatPathEntry, FlatSchema, FlatValueKind};
pub use registry::RuleRegistry;
pub use rule::{Fields, NestedRule, SchemaNode};
pub use token::MetaToken;
pub use types::{ScalarKind, ValueType};
pub use validator::{ValidationReport, Validator};
