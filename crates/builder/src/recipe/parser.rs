//! Recipe loading and validation

use super::model::Recipe;
use globset::Glob;
use kiln_errors::{Error, RecipeError};
use std::path::Path;
use tokio::fs;

/// Parse a recipe from YAML text and validate it
///
/// # Errors
///
/// Returns `RecipeError::ParseError` for malformed YAML or unknown keys,
/// and field-level errors for empty identity fields, malformed dependency
/// pins, or invalid copy-rule globs.
pub fn parse_recipe(content: &str) -> Result<Recipe, Error> {
    let recipe: Recipe = serde_yml::from_str(content).map_err(|e| RecipeError::ParseError {
        message: e.to_string(),
    })?;

    validate(&recipe)?;

    Ok(recipe)
}

/// Read and parse a recipe file
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or any
/// `parse_recipe` validation error.
pub async fn load_recipe(path: &Path) -> Result<Recipe, Error> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))?;
    parse_recipe(&content)
}

fn validate(recipe: &Recipe) -> Result<(), Error> {
    if recipe.metadata.name.trim().is_empty() {
        return Err(RecipeError::MissingField {
            field: "metadata.name".to_string(),
        }
        .into());
    }
    if recipe.metadata.version.trim().is_empty() {
        return Err(RecipeError::MissingField {
            field: "metadata.version".to_string(),
        }
        .into());
    }

    // Malformed pins fail at load time, not mid-pipeline
    recipe.dependency_specs()?;

    for rule in &recipe.package.copy {
        if rule.dst.trim().is_empty() {
            return Err(RecipeError::MissingField {
                field: "package.copy.dst".to_string(),
            }
            .into());
        }
        if Glob::new(&rule.pattern).is_err() {
            return Err(RecipeError::InvalidPattern {
                pattern: rule.pattern.clone(),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const RECIPE: &str = r#"
metadata:
  name: wali-opennwa
  version: "4.2"
  description: WALi weighted automaton library
  license: not set
  url: https://github.com/pdschubert/WALi-OpenNWA
  topics: [WALi, automaton]

default_options:
  shared: false
  fPIC: true

dependencies:
  - llvm-core/12.0.0

patches:
  "4.2":
    - file: patches/cmake-install.patch
    - file: patches/narrowing.patch
      base_dir: Source

package:
  copy:
    - { pattern: "*.h", dst: include, src: Source/wali/include }
    - { pattern: "*.hpp", dst: include, src: Source/wali/include }
    - { pattern: "*.dll", dst: bin, keep_path: false }
    - { pattern: "*.so", dst: lib, keep_path: false }
    - { pattern: "*.dylib", dst: lib, keep_path: false }
    - { pattern: "*.a", dst: lib, keep_path: false }

package_info:
  libs: [wali]
"#;

    #[test]
    fn test_parse_full_recipe() {
        let recipe = parse_recipe(RECIPE).unwrap();
        assert_eq!(recipe.metadata.name, "wali-opennwa");
        assert_eq!(recipe.metadata.version, "4.2");
        assert_eq!(recipe.dependencies.len(), 1);
        assert_eq!(recipe.package.copy.len(), 6);
        assert_eq!(recipe.package_info.libs, vec!["wali".to_string()]);
        // license file defaults when unspecified
        assert_eq!(recipe.package.license, "LICENSE");
    }

    #[test]
    fn test_patches_keyed_by_version_in_order() {
        let recipe = parse_recipe(RECIPE).unwrap();

        let patches = recipe.patches_for("4.2");
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].file, "patches/cmake-install.patch");
        assert_eq!(patches[1].file, "patches/narrowing.patch");
        assert_eq!(patches[1].base_dir.as_deref(), Some("Source"));
        assert_eq!(patches[0].strip, 1);

        // No patches registered for other versions
        assert!(recipe.patches_for("4.3").is_empty());
    }

    #[test]
    fn test_default_options_applied() {
        let recipe = parse_recipe(RECIPE).unwrap();
        let (shared, fpic) = recipe.resolve_options(&BTreeMap::new()).unwrap();
        assert!(!shared);
        assert!(fpic);
    }

    #[test]
    fn test_option_overrides() {
        let recipe = parse_recipe(RECIPE).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert("shared".to_string(), "true".to_string());
        let (shared, fpic) = recipe.resolve_options(&overrides).unwrap();
        assert!(shared);
        assert!(fpic);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let recipe = parse_recipe(RECIPE).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert("with_tests".to_string(), "true".to_string());
        let err = recipe.resolve_options(&overrides).unwrap_err();
        assert!(err.to_string().contains("unknown option"));
    }

    #[test]
    fn test_non_boolean_option_rejected() {
        let recipe = parse_recipe(RECIPE).unwrap();
        let mut overrides = BTreeMap::new();
        overrides.insert("shared".to_string(), "maybe".to_string());
        assert!(recipe.resolve_options(&overrides).is_err());
    }

    #[test]
    fn test_unknown_recipe_key_rejected() {
        let bad = format!("{RECIPE}\nunexpected_section: {{}}\n");
        assert!(parse_recipe(&bad).is_err());
    }

    #[test]
    fn test_malformed_dependency_rejected_at_load() {
        let bad = RECIPE.replace("llvm-core/12.0.0", "llvm-core");
        let err = parse_recipe(&bad).unwrap_err();
        assert!(err.to_string().contains("invalid dependency spec"));
    }

    #[test]
    fn test_invalid_glob_rejected_at_load() {
        let bad = RECIPE.replace("\"*.h\"", "\"[\"");
        assert!(parse_recipe(&bad).is_err());
    }
}
