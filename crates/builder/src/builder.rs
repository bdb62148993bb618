//! Build pipeline orchestration
//!
//! One build is one sequential, fail-fast pipeline:
//! resolve dependencies → apply patches → configure → compile →
//! package → export metadata. No stage runs after a failure, and no
//! partial package is ever published.

use crate::context::BuildContext;
use crate::drivers::{BuildDriver, CMakeDriver};
use crate::environment::BuildEnvironment;
use crate::events::send_event;
use crate::export::{write_package_info, PackageInfo};
use crate::packager::package;
use crate::patch::apply_patches;
use crate::recipe::Recipe;
use kiln_errors::Error;
use kiln_events::Event;
use kiln_index::PackageIndex;
use kiln_types::BuildReport;
use std::path::PathBuf;

/// Builder configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root under which per-variant build trees are created
    pub build_root: PathBuf,
    /// Root under which finished packages are published
    pub output_root: PathBuf,
    /// Parallel jobs for the driver; 0 = auto-detect
    pub jobs: usize,
    /// Whether the driver may reach the network
    pub network_access: bool,
}

impl BuildConfig {
    /// Create a configuration with default job count and no network
    #[must_use]
    pub fn new(build_root: PathBuf, output_root: PathBuf) -> Self {
        Self {
            build_root,
            output_root,
            jobs: 0,
            network_access: false,
        }
    }

    /// Override the job count
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Job count with auto-detection applied
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }
}

/// Runs the build-and-package pipeline for one recipe + variant
pub struct Builder {
    config: BuildConfig,
    index: PackageIndex,
    driver: Box<dyn BuildDriver>,
}

impl Builder {
    /// Create a builder with the default CMake driver
    #[must_use]
    pub fn new(config: BuildConfig, index: PackageIndex) -> Self {
        Self {
            config,
            index,
            driver: Box::new(CMakeDriver::new()),
        }
    }

    /// Substitute the build driver (used by integration tests)
    #[must_use]
    pub fn with_driver(mut self, driver: Box<dyn BuildDriver>) -> Self {
        self.driver = driver;
        self
    }

    /// Run the full pipeline
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure unchanged: unresolved
    /// dependencies, patch failures, driver failures, and packaging
    /// failures all abort the remaining stages.
    pub async fn build(&self, recipe: &Recipe, context: &BuildContext) -> Result<BuildReport, Error> {
        // Dependencies resolve before any build work; a miss is fatal
        send_event(
            context,
            Event::OperationStarted {
                operation: format!("resolving dependencies for {}", context.name),
            },
        );
        let specs = recipe.dependency_specs()?;
        let resolved = self.index.resolve_all(&specs)?;
        for dep in &resolved {
            send_event(
                context,
                Event::DependencyResolved {
                    package: dep.name.clone(),
                    version: dep.version.to_string(),
                },
            );
        }
        send_event(
            context,
            Event::OperationCompleted {
                operation: format!("resolved {} dependencies", resolved.len()),
                success: true,
            },
        );

        let env =
            BuildEnvironment::new(context, &self.config.build_root, self.config.effective_jobs())
                .await?;

        let patches_applied = apply_patches(recipe, context, &env).await?;

        send_event(
            context,
            Event::OperationStarted {
                operation: format!("configuring {} with {}", context.name, self.driver.name()),
            },
        );
        self.driver.configure(&env, &context.variant).await?;

        send_event(
            context,
            Event::OperationStarted {
                operation: format!("building {}", context.name),
            },
        );
        self.driver.build(&env).await?;

        let output = package(recipe, context, &env, &self.config.output_root).await?;

        let info = PackageInfo::from_recipe(recipe, &output);
        write_package_info(&info, &output).await?;

        Ok(BuildReport {
            name: context.name.clone(),
            version: context.version.clone(),
            variant: context.variant.canonical_key(),
            output_path: output.root().to_path_buf(),
            files: output.files().to_vec(),
            dependencies: resolved
                .iter()
                .map(|d| format!("{}/{}", d.name, d.version))
                .collect(),
            patches_applied,
        })
    }
}
