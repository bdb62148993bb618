//! Shared fixtures for builder integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use kiln_builder::{BuildDriver, BuildEnvironment};
use kiln_errors::Error;
use kiln_types::{Arch, BuildType, Compiler, Os, VariantKey};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Test double for the external build system
///
/// Records phase invocations and fabricates the artifacts a real build
/// would have produced, without requiring any toolchain.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<String>>>,
    artifacts: Vec<PathBuf>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files (relative to the build directory) that `build()` fabricates
    pub fn with_artifacts(artifacts: Vec<PathBuf>) -> Self {
        Self {
            calls: Arc::default(),
            artifacts,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BuildDriver for RecordingDriver {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn configure_args(&self, _env: &BuildEnvironment, variant: &VariantKey) -> Vec<String> {
        vec![variant.canonical_key()]
    }

    async fn configure(&self, env: &BuildEnvironment, _variant: &VariantKey) -> Result<(), Error> {
        self.calls.lock().unwrap().push("configure".to_string());
        std::fs::create_dir_all(env.build_dir())?;
        Ok(())
    }

    async fn build(&self, env: &BuildEnvironment) -> Result<(), Error> {
        self.calls.lock().unwrap().push("build".to_string());
        for artifact in &self.artifacts {
            let path = env.build_dir().join(artifact);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, b"artifact")?;
        }
        Ok(())
    }
}

/// The fixed Linux static+PIC variant used by the scenarios
pub fn linux_static_pic() -> VariantKey {
    VariantKey {
        os: Os::Linux,
        compiler: Compiler::Gcc,
        build_type: BuildType::Release,
        arch: Arch::X86_64,
        shared: false,
        fpic: true,
    }
}
