//! Artifact packaging
//!
//! After a successful build, the packager copies selected artifacts out
//! of the build tree into the canonical package layout
//! `{include/, bin/, lib/}` plus the license file. Rules are applied in
//! recipe order against a sorted file listing, so collisions resolve
//! last-write-wins deterministically. Everything is staged under a
//! scratch directory and published by a single rename, so an aborted
//! build never leaves a partial package visible.

use crate::context::BuildContext;
use crate::environment::BuildEnvironment;
use crate::events::send_event;
use crate::fileops::{collect_files_sorted, copy_directory_recursive, remove_dir_if_exists};
use crate::recipe::{CopyRule, Recipe};
use globset::Glob;
use kiln_errors::{Error, PackageError, RecipeError};
use kiln_events::Event;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A published package directory
#[derive(Debug, Clone)]
pub struct PackageOutput {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl PackageOutput {
    /// Create a package output handle
    #[must_use]
    pub fn new(root: PathBuf, files: Vec<PathBuf>) -> Self {
        Self { root, files }
    }

    /// Published package root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files in the package, relative to the root, sorted
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether the package contains the given top-level directory
    #[must_use]
    pub fn has_dir(&self, name: &str) -> bool {
        self.root.join(name).is_dir()
    }
}

/// Copy artifacts per the recipe's rules and publish the package
///
/// A rule matching zero files is a no-op unless it is marked `required`.
/// The output directory is scoped to the variant and rebuilt from
/// scratch every time, so artifacts from another variant cannot leak in.
///
/// # Errors
///
/// Returns `PackageError::MissingArtifact` when a required rule matches
/// nothing, and `PackageError::PublishFailed` when the final rename
/// cannot be completed.
pub async fn package(
    recipe: &Recipe,
    context: &BuildContext,
    env: &BuildEnvironment,
    output_root: &Path,
) -> Result<PackageOutput, Error> {
    send_event(
        context,
        Event::OperationStarted {
            operation: "packaging artifacts".to_string(),
        },
    );

    let staging = env.staging_dir().to_path_buf();
    remove_dir_if_exists(&staging).await?;
    fs::create_dir_all(&staging)
        .await
        .map_err(|e| Error::io_with_path(&e, &staging))?;

    copy_license(recipe, env, &staging).await?;

    let all_files = collect_files_sorted(env.source_dir()).await?;
    for rule in &recipe.package.copy {
        let count = apply_rule(rule, env.source_dir(), &all_files, &staging).await?;
        if count == 0 && rule.required {
            return Err(PackageError::MissingArtifact {
                pattern: rule.pattern.clone(),
            }
            .into());
        }
        send_event(
            context,
            Event::ArtifactsCopied {
                pattern: rule.pattern.clone(),
                count,
            },
        );
    }

    let files = collect_files_sorted(&staging).await?;

    fs::create_dir_all(output_root)
        .await
        .map_err(|e| Error::io_with_path(&e, output_root))?;
    let final_dir = output_root.join(context.scoped_dir_name());
    remove_dir_if_exists(&final_dir).await?;
    publish(&staging, &final_dir).await?;

    send_event(
        context,
        Event::OperationCompleted {
            operation: "packaging artifacts".to_string(),
            success: true,
        },
    );

    Ok(PackageOutput::new(final_dir, files))
}

/// The license copy is best-effort, like any optional artifact
async fn copy_license(
    recipe: &Recipe,
    env: &BuildEnvironment,
    staging: &Path,
) -> Result<(), Error> {
    let license_src = env.source_dir().join(&recipe.package.license);
    if !license_src.is_file() {
        return Ok(());
    }

    let file_name = license_src
        .file_name()
        .map(std::ffi::OsStr::to_owned)
        .unwrap_or_default();
    fs::copy(&license_src, staging.join(file_name))
        .await
        .map_err(|e| Error::io_with_path(&e, &license_src))?;
    Ok(())
}

async fn apply_rule(
    rule: &CopyRule,
    source_root: &Path,
    all_files: &[PathBuf],
    staging: &Path,
) -> Result<usize, Error> {
    let matcher = Glob::new(&rule.pattern)
        .map_err(|_| RecipeError::InvalidPattern {
            pattern: rule.pattern.clone(),
        })?
        .compile_matcher();

    let mut count = 0;
    for rel in all_files {
        // Restrict to the rule's source root and match below it
        let candidate = match &rule.src {
            Some(src) => match rel.strip_prefix(src) {
                Ok(below) => below,
                Err(_) => continue,
            },
            None => rel.as_path(),
        };

        if !matcher.is_match(candidate) {
            continue;
        }

        let dest_rel = if rule.keep_path {
            candidate.to_path_buf()
        } else {
            PathBuf::from(
                candidate
                    .file_name()
                    .map(std::ffi::OsStr::to_owned)
                    .unwrap_or_default(),
            )
        };

        let dest = staging.join(&rule.dst).join(&dest_rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        fs::copy(source_root.join(rel), &dest)
            .await
            .map_err(|e| Error::io_with_path(&e, rel))?;
        count += 1;
    }

    Ok(count)
}

/// Atomic publish: rename the staged tree into place, falling back to a
/// copy when staging and output live on different filesystems
async fn publish(staging: &Path, final_dir: &Path) -> Result<(), Error> {
    if fs::rename(staging, final_dir).await.is_ok() {
        return Ok(());
    }

    copy_directory_recursive(staging, final_dir)
        .await
        .map_err(|e| {
            Error::from(PackageError::PublishFailed {
                message: e.to_string(),
            })
        })?;
    remove_dir_if_exists(staging).await
}
