//! [`FixtureDir`] temporary directory for configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory that configuration documents are written into.
///
/// # Example
///
/// ```rust
/// use strata_test_utils::{fixtures, FixtureDir};
///
/// let dir = FixtureDir::new();
/// let schema = dir.write("defaults.yaml", fixtures::SENSOR_SCHEMA);
/// assert!(schema.exists());
/// assert!(!dir.missing("absent.yaml").exists());
/// ```
pub struct FixtureDir {
    temp_dir: TempDir,
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `name` (relative to the root), creating parent
    /// directories, and return the full path.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Path of a file that is guaranteed not to exist.
    pub fn missing(&self, name: &str) -> PathBuf {
        let path = self.root().join(name);
        assert!(!path.exists(), "Expected file NOT to exist: {}", path.display());
        path
    }

    /// Read back a file written under the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, name: &str) -> String {
        let path = self.root().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }
}
