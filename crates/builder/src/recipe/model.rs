//! Declarative recipe format for kiln
//!
//! A recipe describes one buildable package: identity metadata, the
//! option matrix it supports, dependency pins, version-keyed patches,
//! artifact copy rules, and the link metadata exported to consumers.
//! Unknown keys are rejected at parse time; the option set is a closed
//! enumeration.

use kiln_errors::{Error, RecipeError};
use kiln_types::{parse_option_bool, DependencySpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Complete recipe structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recipe {
    /// Package metadata (required)
    pub metadata: Metadata,

    /// Option matrix this recipe supports (optional)
    #[serde(default)]
    pub options: OptionsDecl,

    /// Option values used when the caller specifies none (optional)
    #[serde(default)]
    pub default_options: DefaultOptions,

    /// External dependency pins, one `<name>/<version>` per line (optional)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    /// Source patches keyed by recipe version (optional)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub patches: HashMap<String, Vec<PatchFile>>,

    /// Artifact packaging rules (optional)
    #[serde(default)]
    pub package: PackageRules,

    /// Consumer-facing link metadata (optional)
    #[serde(default)]
    pub package_info: PackageInfoDecl,
}

/// Package metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
}

/// The closed set of options a recipe exposes, with their allowed values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsDecl {
    #[serde(default = "both_bools")]
    pub shared: Vec<bool>,

    #[serde(rename = "fPIC", default = "both_bools")]
    pub fpic: Vec<bool>,
}

fn both_bools() -> Vec<bool> {
    vec![true, false]
}

impl Default for OptionsDecl {
    fn default() -> Self {
        Self {
            shared: both_bools(),
            fpic: both_bools(),
        }
    }
}

/// Option values applied when the invocation does not override them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultOptions {
    #[serde(default)]
    pub shared: bool,

    #[serde(rename = "fPIC", default = "default_fpic")]
    pub fpic: bool,
}

fn default_fpic() -> bool {
    true
}

impl Default for DefaultOptions {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: default_fpic(),
        }
    }
}

/// One source patch descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchFile {
    /// Patch file path, relative to the recipe directory
    pub file: String,

    /// Directory under the source root to apply from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,

    /// Leading path components stripped from diff headers
    #[serde(default = "default_strip")]
    pub strip: u32,
}

fn default_strip() -> u32 {
    1
}

/// Packaging rules: what gets copied into the published layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageRules {
    /// License file copied into the package root when present
    #[serde(default = "default_license_file")]
    pub license: String,

    /// Copy rules applied in order; later rules overwrite earlier ones
    /// at the same destination path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub copy: Vec<CopyRule>,
}

fn default_license_file() -> String {
    "LICENSE".to_string()
}

impl Default for PackageRules {
    fn default() -> Self {
        Self {
            license: default_license_file(),
            copy: Vec::new(),
        }
    }
}

/// One artifact copy rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
    /// Glob pattern matched against paths relative to the source root
    pub pattern: String,

    /// Destination subdirectory inside the package
    pub dst: String,

    /// Restrict matching to this subdirectory of the build tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    /// Preserve directory structure below the source root; `false`
    /// flattens matches directly into `dst` (last write wins)
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,

    /// Zero matches abort packaging instead of being a no-op
    #[serde(default)]
    pub required: bool,
}

fn default_keep_path() -> bool {
    true
}

/// Link metadata exported for downstream consumers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageInfoDecl {
    /// Library base names consumers must link against
    #[serde(default)]
    pub libs: Vec<String>,

    /// Preprocessor defines consumers must set
    #[serde(default)]
    pub defines: Vec<String>,
}

impl Recipe {
    /// Parse the declared dependency pins
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidDependencySpec` for malformed pins.
    pub fn dependency_specs(&self) -> Result<Vec<DependencySpec>, Error> {
        self.dependencies
            .iter()
            .map(|s| s.parse::<DependencySpec>().map_err(Error::from))
            .collect()
    }

    /// Patches registered for the given recipe version, in application order
    #[must_use]
    pub fn patches_for(&self, version: &str) -> &[PatchFile] {
        self.patches.get(version).map_or(&[], Vec::as_slice)
    }

    /// Resolve the `shared`/`fPIC` option values for one invocation
    ///
    /// Starts from `default_options`, then applies the caller's overrides.
    /// Unknown keys, non-boolean values, and values outside the declared
    /// option matrix are all rejected.
    ///
    /// # Errors
    ///
    /// Returns a `RecipeError` describing the offending key or value.
    pub fn resolve_options(
        &self,
        overrides: &BTreeMap<String, String>,
    ) -> Result<(bool, bool), Error> {
        let mut shared = self.default_options.shared;
        let mut fpic = self.default_options.fpic;

        for (key, value) in overrides {
            match key.as_str() {
                "shared" => {
                    shared = parse_option_bool(key, value).map_err(Error::from)?;
                    if !self.options.shared.contains(&shared) {
                        return Err(RecipeError::OptionNotAllowed {
                            key: key.clone(),
                            value: value.clone(),
                        }
                        .into());
                    }
                }
                "fPIC" => {
                    fpic = parse_option_bool(key, value).map_err(Error::from)?;
                    if !self.options.fpic.contains(&fpic) {
                        return Err(RecipeError::OptionNotAllowed {
                            key: key.clone(),
                            value: value.clone(),
                        }
                        .into());
                    }
                }
                _ => {
                    return Err(RecipeError::UnknownOption { key: key.clone() }.into());
                }
            }
        }

        Ok((shared, fpic))
    }
}
