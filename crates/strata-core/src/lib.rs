//! Layered configuration resolution for strata
//!
//! [`ConfigManager`] compiles a default document, stacks overlay files,
//! environment variables and command-line options on top of it, and exports
//! or validates the result.
//!
//! - [`flat_index`] maps environment and CLI keys to configuration paths
//! - [`overlay`] holds the append-only stack of layers
//! - [`cli_args`] turns raw arguments into option pairs

pub mod cli_args;
pub mod error;
pub mod flat_index;
pub mod manager;
pub mod merge;
pub mod overlay;

pub use cli_args::parse_cli_args;
pub use error::{Error, Result};
pub use flat_index::{FlatKeyMap, KeyStyle};
pub use manager::{ConfigManager, ManagerOptions};
pub use merge::deep_merge;
pub use overlay::{ConfigOverlay, LayerWriter, WriteTarget};
