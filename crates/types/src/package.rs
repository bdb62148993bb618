//! Package identity and dependency specifications

use kiln_errors::ResolveError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique package identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId {
    pub name: String,
    pub version: Version,
}

impl PackageId {
    /// Create a new package identifier
    #[must_use]
    pub fn new(name: String, version: Version) -> Self {
        Self { name, version }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// A declared external dependency, pinned to an exact version
///
/// The textual form is `<name>/<version>`, one per required library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub version: Version,
}

impl DependencySpec {
    /// Check whether an installed package satisfies this pin
    #[must_use]
    pub fn matches(&self, name: &str, version: &Version) -> bool {
        self.name == name && &self.version == version
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for DependencySpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s.split_once('/').ok_or_else(|| {
            ResolveError::InvalidDependencySpec {
                spec: s.to_string(),
            }
        })?;

        if name.is_empty() {
            return Err(ResolveError::InvalidDependencySpec {
                spec: s.to_string(),
            });
        }

        let version =
            Version::parse(version).map_err(|_| ResolveError::InvalidDependencySpec {
                spec: s.to_string(),
            })?;

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_spec_parse() {
        let spec: DependencySpec = "llvm-core/12.0.0".parse().unwrap();
        assert_eq!(spec.name, "llvm-core");
        assert_eq!(spec.version, Version::new(12, 0, 0));
        assert_eq!(spec.to_string(), "llvm-core/12.0.0");
    }

    #[test]
    fn test_dependency_spec_rejects_malformed() {
        assert!("llvm-core".parse::<DependencySpec>().is_err());
        assert!("/1.0.0".parse::<DependencySpec>().is_err());
        assert!("llvm-core/not-a-version".parse::<DependencySpec>().is_err());
    }

    #[test]
    fn test_dependency_spec_matches_exact_pin() {
        let spec: DependencySpec = "zlib/1.3.1".parse().unwrap();
        assert!(spec.matches("zlib", &Version::new(1, 3, 1)));
        assert!(!spec.matches("zlib", &Version::new(1, 3, 0)));
        assert!(!spec.matches("libz", &Version::new(1, 3, 1)));
    }
}
