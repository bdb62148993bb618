//! Isolated build environment
//!
//! Each build gets its own directory tree derived from the canonical
//! variant key, so parallel variant builds never share state and stale
//! artifacts from another variant cannot leak into a package:
//!
//! ```text
//! <build_root>/<name>-<version>-<variant>/
//!     src/        exported sources (fresh copy per build)
//!     src/build/  out-of-source build directory used by the driver
//!     stage/      staging area the packager fills before publishing
//! ```

use crate::context::BuildContext;
use crate::events::send_event;
use crate::fileops::{copy_directory_recursive, remove_dir_if_exists};
use kiln_errors::{BuildError, Error};
use kiln_events::Event;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;

/// Captured result of one external command
#[derive(Debug, Clone)]
pub struct BuildCommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Per-build directory layout and process execution
#[derive(Debug, Clone)]
pub struct BuildEnvironment {
    context: BuildContext,
    root: PathBuf,
    source_dir: PathBuf,
    build_dir: PathBuf,
    staging_dir: PathBuf,
    env_vars: HashMap<String, String>,
    jobs: usize,
}

impl BuildEnvironment {
    /// Create a fresh environment for one build
    ///
    /// Any tree left over from a previous build of the same variant is
    /// removed first. Patches are not idempotent, so every build starts
    /// from a clean copy of the exported sources.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the source
    /// copy fails.
    pub async fn new(
        context: &BuildContext,
        build_root: &Path,
        jobs: usize,
    ) -> Result<Self, Error> {
        let root = build_root.join(context.scoped_dir_name());
        remove_dir_if_exists(&root).await?;

        let source_dir = root.join("src");
        let build_dir = source_dir.join("build");
        let staging_dir = root.join("stage");

        fs::create_dir_all(&source_dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &source_dir))?;

        copy_directory_recursive(&context.recipe_dir, &source_dir).await?;

        let (cc, cxx) = context.variant.compiler.toolchain();
        let mut env_vars = HashMap::new();
        env_vars.insert("CC".to_string(), cc.to_string());
        env_vars.insert("CXX".to_string(), cxx.to_string());
        env_vars.insert("JOBS".to_string(), jobs.to_string());

        Ok(Self {
            context: context.clone(),
            root,
            source_dir,
            build_dir,
            staging_dir,
            env_vars,
            jobs,
        })
    }

    /// Root of this build's directory tree
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Exported source tree
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Out-of-source build directory
    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Staging area the packager fills before publishing
    #[must_use]
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Environment variables applied to every command
    #[must_use]
    pub fn env_vars(&self) -> &HashMap<String, String> {
        &self.env_vars
    }

    /// Parallel jobs for the build driver
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Execute a command in the build environment
    ///
    /// The exit status is captured, not interpreted; callers classify a
    /// non-zero exit according to the phase they run. Output is captured
    /// in full so failures can surface it verbatim.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingBuildTool` when the program cannot be
    /// found and `BuildError::Failed` for other spawn failures.
    pub async fn execute_command(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<BuildCommandResult, Error> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.envs(&self.env_vars);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        } else {
            cmd.current_dir(&self.source_dir);
        }

        send_event(
            &self.context,
            Event::BuildStepStarted {
                package: self.context.name.clone(),
                step: format!("{program} {}", args.join(" ")),
            },
        );

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::from(BuildError::MissingBuildTool {
                    name: program.to_string(),
                })
            } else {
                Error::from(BuildError::Failed {
                    message: format!("{program}: {e}"),
                })
            }
        })?;

        Ok(BuildCommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Remove this build's directory tree
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    pub async fn cleanup(&self) -> Result<(), Error> {
        remove_dir_if_exists(&self.root).await?;
        send_event(
            &self.context,
            Event::OperationCompleted {
                operation: format!("Cleaned build tree for {}", self.context.name),
                success: true,
            },
        );
        Ok(())
    }
}
