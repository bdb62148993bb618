#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Local package index for kiln
//!
//! The index records which external packages are installed on this
//! machine. Dependency declarations from recipes are resolved against it
//! before any build work starts; an unsatisfied pin aborts the pipeline.
//! Network-backed resolution is out of scope: the index is a local TOML
//! file maintained by whatever installs the dependencies.

use kiln_errors::{Error, ResolveError};
use kiln_types::DependencySpec;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One installed package known to the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: Version,
    /// Installation prefix, when the installer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<PathBuf>,
}

/// A dependency pin resolved to a concrete installed package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDependency {
    pub name: String,
    pub version: Version,
    pub prefix: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    #[serde(default)]
    packages: Vec<InstalledPackage>,
}

/// The set of installed packages dependency pins resolve against
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: Vec<InstalledPackage>,
}

impl PackageIndex {
    /// Create an empty index
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from an in-memory package list
    #[must_use]
    pub fn from_packages(packages: Vec<InstalledPackage>) -> Self {
        Self { packages }
    }

    /// Load the index from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::IndexNotFound` if the file does not exist
    /// and `ResolveError::IndexParseError` if it cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(ResolveError::IndexNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let file: IndexFile =
            toml::from_str(&content).map_err(|e| ResolveError::IndexParseError {
                message: e.to_string(),
            })?;

        Ok(Self {
            packages: file.packages,
        })
    }

    /// Number of installed packages in the index
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Resolve one dependency pin to an installed package
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::UnresolvedDependency` when no installed
    /// package matches the pin exactly.
    pub fn resolve(&self, spec: &DependencySpec) -> Result<ResolvedDependency, Error> {
        self.packages
            .iter()
            .find(|p| spec.matches(&p.name, &p.version))
            .map(|p| ResolvedDependency {
                name: p.name.clone(),
                version: p.version.clone(),
                prefix: p.prefix.clone(),
            })
            .ok_or_else(|| {
                ResolveError::UnresolvedDependency {
                    spec: spec.to_string(),
                }
                .into()
            })
    }

    /// Resolve all pins in declaration order, aborting on the first miss
    ///
    /// # Errors
    ///
    /// Returns the first `ResolveError::UnresolvedDependency` encountered.
    pub fn resolve_all(&self, specs: &[DependencySpec]) -> Result<Vec<ResolvedDependency>, Error> {
        specs.iter().map(|spec| self.resolve(spec)).collect()
    }
}
