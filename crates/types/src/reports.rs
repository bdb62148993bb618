//! Structured summaries returned by pipeline operations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a completed build-and-package run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Package name from the recipe
    pub name: String,
    /// Package version from the recipe
    pub version: String,
    /// Canonical variant key the package was built for
    pub variant: String,
    /// Published package directory
    pub output_path: PathBuf,
    /// Files placed into the package, relative to `output_path`
    pub files: Vec<PathBuf>,
    /// Dependencies resolved before the build started
    pub dependencies: Vec<String>,
    /// Patches applied to the source tree
    pub patches_applied: usize,
}

impl BuildReport {
    /// Number of files in the published package
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
