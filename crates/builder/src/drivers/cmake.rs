//! CMake build driver

use super::BuildDriver;
use crate::environment::BuildEnvironment;
use async_trait::async_trait;
use kiln_errors::{BuildError, Error};
use kiln_types::VariantKey;
use tokio::fs;

/// CMake driver: configure with cache variables, build with
/// `cmake --build`
pub struct CMakeDriver;

impl CMakeDriver {
    /// Create a new CMake driver instance
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for CMakeDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildDriver for CMakeDriver {
    fn name(&self) -> &'static str {
        "cmake"
    }

    fn configure_args(&self, env: &BuildEnvironment, variant: &VariantKey) -> Vec<String> {
        let mut args = vec![
            env.source_dir().display().to_string(),
            format!("-DCMAKE_BUILD_TYPE={}", variant.build_type.as_cmake()),
            format!(
                "-DBUILD_SHARED_LIBS={}",
                if variant.shared { "ON" } else { "OFF" }
            ),
        ];

        // Shared builds are PIC by construction; the flag only matters
        // for static archives whose objects may end up in shared consumers.
        if !variant.shared && variant.fpic {
            args.push("-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string());
        }

        args
    }

    async fn configure(&self, env: &BuildEnvironment, variant: &VariantKey) -> Result<(), Error> {
        which::which("cmake").map_err(|_| BuildError::MissingBuildTool {
            name: "cmake".to_string(),
        })?;

        fs::create_dir_all(env.build_dir())
            .await
            .map_err(|e| Error::io_with_path(&e, env.build_dir()))?;

        let args = self.configure_args(env, variant);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let result = env
            .execute_command("cmake", &arg_refs, Some(env.build_dir()))
            .await?;

        if !result.success {
            return Err(BuildError::ConfigureFailed {
                message: format!(
                    "cmake configure failed:\n{}\n{}",
                    result.stdout, result.stderr
                ),
            }
            .into());
        }

        Ok(())
    }

    async fn build(&self, env: &BuildEnvironment) -> Result<(), Error> {
        let mut args = vec!["--build".to_string(), ".".to_string()];

        if env.jobs() > 1 {
            args.push("--parallel".to_string());
            args.push(env.jobs().to_string());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = env
            .execute_command("cmake", &arg_refs, Some(env.build_dir()))
            .await?;

        if !result.success {
            return Err(BuildError::CompileFailed {
                message: format!("cmake build failed:\n{}\n{}", result.stdout, result.stderr),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildContext;
    use crate::recipe::parse_recipe;
    use kiln_types::{Arch, BuildType, Compiler, Os};

    const MINIMAL: &str = r#"
metadata:
  name: demo
  version: "1.0"
  description: demo
  license: MIT
"#;

    async fn make_env(variant: VariantKey) -> (tempfile::TempDir, tempfile::TempDir, BuildEnvironment) {
        let recipe_dir = tempfile::tempdir().unwrap();
        let build_root = tempfile::tempdir().unwrap();
        let recipe = parse_recipe(MINIMAL).unwrap();
        let context = BuildContext::new(&recipe, recipe_dir.path(), variant);
        let env = BuildEnvironment::new(&context, build_root.path(), 1)
            .await
            .unwrap();
        (recipe_dir, build_root, env)
    }

    fn linux_variant(shared: bool, fpic: bool) -> VariantKey {
        VariantKey {
            os: Os::Linux,
            compiler: Compiler::Gcc,
            build_type: BuildType::Release,
            arch: Arch::X86_64,
            shared,
            fpic,
        }
    }

    #[tokio::test]
    async fn test_configure_args_deterministic() {
        let variant = linux_variant(false, true);
        let (_r, _b, env) = make_env(variant.clone()).await;
        let driver = CMakeDriver::new();

        let first = driver.configure_args(&env, &variant);
        let second = driver.configure_args(&env, &variant);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_static_fpic_variant_sets_pic_flag() {
        let variant = linux_variant(false, true);
        let (_r, _b, env) = make_env(variant.clone()).await;
        let driver = CMakeDriver::new();

        let args = driver.configure_args(&env, &variant);
        assert!(args.contains(&"-DBUILD_SHARED_LIBS=OFF".to_string()));
        assert!(args.contains(&"-DCMAKE_POSITION_INDEPENDENT_CODE=ON".to_string()));
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=Release".to_string()));
    }

    #[tokio::test]
    async fn test_shared_variant_ignores_fpic() {
        let variant = linux_variant(true, true);
        let (_r, _b, env) = make_env(variant.clone()).await;
        let driver = CMakeDriver::new();

        let args = driver.configure_args(&env, &variant);
        assert!(args.contains(&"-DBUILD_SHARED_LIBS=ON".to_string()));
        assert!(!args
            .iter()
            .any(|a| a.starts_with("-DCMAKE_POSITION_INDEPENDENT_CODE")));
    }

    #[tokio::test]
    async fn test_build_type_translation() {
        let mut variant = linux_variant(false, false);
        variant.build_type = BuildType::RelWithDebInfo;
        let (_r, _b, env) = make_env(variant.clone()).await;
        let driver = CMakeDriver::new();

        let args = driver.configure_args(&env, &variant);
        assert!(args.contains(&"-DCMAKE_BUILD_TYPE=RelWithDebInfo".to_string()));
    }
}
