//! Document model, codecs, and path utilities for strata
//!
//! Every configuration document, whatever its on-disk format, is parsed into
//! a [`Node`] tree. Handlers convert between text and that tree; the path
//! module navigates and edits it.

pub mod codec;
pub mod error;
pub mod format;
pub mod handlers;
pub mod io;
pub mod node;
pub mod path;

pub use codec::DocumentCodec;
pub use error::{Error, Result};
pub use format::{Format, FormatHandler};
pub use node::{Mapping, Node, Scalar};
pub use path::PathSegment;
