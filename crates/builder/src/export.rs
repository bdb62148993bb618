//! Consumer-facing package metadata
//!
//! Downstream consumers need to know which libraries to link and where
//! the package keeps headers and binaries. The computation is pure;
//! writing the metadata file is a separate step owned by the pipeline.

use crate::packager::PackageOutput;
use crate::recipe::Recipe;
use kiln_errors::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Link metadata consumers of a package must apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    /// Library base names to link against
    pub libs: Vec<String>,
    /// Preprocessor defines to set
    pub defines: Vec<String>,
    /// Header directories present in the package, relative to its root
    pub include_dirs: Vec<String>,
    /// Library directories present in the package
    pub lib_dirs: Vec<String>,
    /// Runtime/dll directories present in the package
    pub bin_dirs: Vec<String>,
}

impl PackageInfo {
    /// Compute link metadata from the recipe and the published layout
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, output: &PackageOutput) -> Self {
        let present = |dir: &str| -> Vec<String> {
            if output.has_dir(dir) {
                vec![dir.to_string()]
            } else {
                Vec::new()
            }
        };

        Self {
            name: recipe.metadata.name.clone(),
            version: recipe.metadata.version.clone(),
            libs: recipe.package_info.libs.clone(),
            defines: recipe.package_info.defines.clone(),
            include_dirs: present("include"),
            lib_dirs: present("lib"),
            bin_dirs: present("bin"),
        }
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the metadata file into the published package
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_package_info(
    info: &PackageInfo,
    output: &PackageOutput,
) -> Result<PathBuf, Error> {
    let path = output.root().join("kiln-info.json");
    fs::write(&path, info.to_json()?)
        .await
        .map_err(|e| Error::io_with_path(&e, &path))?;
    Ok(path)
}
