//! Build driver abstraction
//!
//! The driver is the capability boundary between the pipeline and the
//! external build system: two ordered phases, `configure` then `build`,
//! both delegated to an opaque tool. Variant translation must be
//! deterministic (the same variant always yields the same argument
//! vector) and a failing phase surfaces the tool's full output.
//! Integration tests substitute a recording double for the real tool.

use crate::environment::BuildEnvironment;
use async_trait::async_trait;
use kiln_errors::Error;
use kiln_types::VariantKey;

mod cmake;

pub use cmake::CMakeDriver;

/// Trait for build driver implementations
#[async_trait]
pub trait BuildDriver: Send + Sync {
    /// Driver name
    fn name(&self) -> &'static str;

    /// Deterministic translation of a variant into configure arguments
    fn configure_args(&self, env: &BuildEnvironment, variant: &VariantKey) -> Vec<String>;

    /// Configure phase
    async fn configure(&self, env: &BuildEnvironment, variant: &VariantKey) -> Result<(), Error>;

    /// Build phase
    async fn build(&self, env: &BuildEnvironment) -> Result<(), Error>;
}
