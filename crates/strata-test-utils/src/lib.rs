//! Shared test utilities for the strata workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`fixtures`]: annotated schema documents and overlays
//! - [`dir`]: [`FixtureDir`](dir::FixtureDir) for writing them to disk

pub mod dir;
pub mod fixtures;

pub use dir::FixtureDir;
