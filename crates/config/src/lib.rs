#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for kiln
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (kiln.toml)
//! - Environment variables (`KILN_*`)
//! - CLI flags (applied by the caller, highest precedence)

use kiln_errors::{ConfigError, Error};
use kiln_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Parallel build jobs for the driver; 0 = auto-detect
    #[serde(default)]
    pub build_jobs: usize,
    /// Whether builds may reach the network
    #[serde(default)]
    pub network_access: bool,
}

/// Filesystem layout configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root under which per-variant build trees are created
    #[serde(default)]
    pub build_root: Option<PathBuf>,
    /// Root under which finished packages are published
    #[serde(default)]
    pub output_root: Option<PathBuf>,
    /// Local package index file
    #[serde(default)]
    pub index_file: Option<PathBuf>,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color_choice(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            build_jobs: 0,
            network_access: false,
        }
    }
}

impl Config {
    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Merge environment variables over file values
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an unparseable
    /// value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(jobs) = std::env::var("KILN_BUILD_JOBS") {
            self.build.build_jobs =
                jobs.parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "build.build_jobs".to_string(),
                        value: jobs,
                    })?;
        }

        if let Ok(root) = std::env::var("KILN_BUILD_ROOT") {
            self.paths.build_root = Some(PathBuf::from(root));
        }

        if let Ok(root) = std::env::var("KILN_OUTPUT_ROOT") {
            self.paths.output_root = Some(PathBuf::from(root));
        }

        if let Ok(index) = std::env::var("KILN_INDEX") {
            self.paths.index_file = Some(PathBuf::from(index));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_when_no_file() {
        let config = Config::load_or_default(None).await.unwrap();
        assert_eq!(config.build.build_jobs, 0);
        assert!(!config.build.network_access);
        assert!(config.paths.build_root.is_none());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiln.toml");
        std::fs::write(
            &path,
            "[build]\nbuild_jobs = 4\n\n[paths]\nbuild_root = \"/tmp/kiln\"\n",
        )
        .unwrap();

        let config = Config::load_or_default(Some(&path)).await.unwrap();
        assert_eq!(config.build.build_jobs, 4);
        assert_eq!(
            config.paths.build_root.as_deref(),
            Some(Path::new("/tmp/kiln"))
        );
    }

    #[tokio::test]
    async fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiln.toml");
        std::fs::write(&path, "[build\nbroken").unwrap();

        assert!(Config::load_or_default(Some(&path)).await.is_err());
    }
}
