//! End-to-end pipeline tests against the recording driver

mod common;

use common::{linux_static_pic, RecordingDriver};
use kiln_builder::{parse_recipe, BuildConfig, BuildContext, Builder};
use kiln_index::{InstalledPackage, PackageIndex};
use semver::Version;
use std::path::{Path, PathBuf};

fn build_config(root: &Path) -> BuildConfig {
    BuildConfig::new(root.join("build"), root.join("packages")).with_jobs(1)
}

#[tokio::test]
async fn test_unresolved_dependency_aborts_before_any_build_work() {
    let recipe_dir = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    // The patch table is a tripwire: if the pipeline got past resolution,
    // the missing patch file would fail with a different error.
    let recipe = parse_recipe(
        r#"
metadata:
  name: wali-opennwa
  version: "4.2"
  description: WALi weighted automaton library
  license: not set
dependencies:
  - llvm-core/12.0.0
patches:
  "4.2":
    - file: patches/does-not-exist.patch
"#,
    )
    .unwrap();

    let driver = RecordingDriver::new();
    let builder = Builder::new(build_config(work.path()), PackageIndex::empty())
        .with_driver(Box::new(driver.clone()));
    let context = BuildContext::new(&recipe, recipe_dir.path(), linux_static_pic());

    let err = builder.build(&recipe, &context).await.unwrap_err();

    assert!(err.to_string().contains("unresolved dependency"));
    assert!(err.to_string().contains("llvm-core/12.0.0"));
    // Neither phase of the driver ever ran
    assert!(driver.calls().is_empty());
    // No package directory was created
    assert!(!work.path().join("packages").exists());
}

#[tokio::test]
async fn test_invalid_patch_aborts_before_configure() {
    let recipe_dir = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let recipe = parse_recipe(
        r#"
metadata:
  name: wali-opennwa
  version: "4.2"
  description: WALi weighted automaton library
  license: not set
patches:
  "4.2":
    - file: patches/does-not-exist.patch
"#,
    )
    .unwrap();

    let driver = RecordingDriver::new();
    let builder = Builder::new(build_config(work.path()), PackageIndex::empty())
        .with_driver(Box::new(driver.clone()));
    let context = BuildContext::new(&recipe, recipe_dir.path(), linux_static_pic());

    let err = builder.build(&recipe, &context).await.unwrap_err();

    assert!(err.to_string().contains("patch failed"));
    assert!(err.to_string().contains("patches/does-not-exist.patch"));
    assert!(driver.calls().is_empty());
}

#[tokio::test]
async fn test_end_to_end_static_linux_package() {
    let recipe_dir = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let include_dir = recipe_dir.path().join("Source/wali/include");
    std::fs::create_dir_all(&include_dir).unwrap();
    std::fs::write(include_dir.join("foo.h"), "#pragma once\n").unwrap();

    let recipe = parse_recipe(
        r#"
metadata:
  name: wali-opennwa
  version: "4.2"
  description: WALi weighted automaton library
  license: not set
dependencies:
  - llvm-core/12.0.0
package:
  copy:
    - { pattern: "*.h", dst: include, src: Source/wali/include }
    - { pattern: "*.a", dst: lib, keep_path: false }
package_info:
  libs: [wali]
"#,
    )
    .unwrap();

    let index = PackageIndex::from_packages(vec![InstalledPackage {
        name: "llvm-core".to_string(),
        version: Version::new(12, 0, 0),
        prefix: None,
    }]);

    let driver = RecordingDriver::with_artifacts(vec![PathBuf::from("libwali.a")]);
    let builder =
        Builder::new(build_config(work.path()), index).with_driver(Box::new(driver.clone()));
    let context = BuildContext::new(&recipe, recipe_dir.path(), linux_static_pic());

    let report = builder.build(&recipe, &context).await.unwrap();

    // Both phases ran, in order
    assert_eq!(driver.calls(), vec!["configure", "build"]);

    // The package contains exactly the header and the archive
    assert_eq!(
        report.files,
        vec![
            PathBuf::from("include/foo.h"),
            PathBuf::from("lib/libwali.a"),
        ]
    );
    assert!(report.output_path.join("include/foo.h").is_file());
    assert!(report.output_path.join("lib/libwali.a").is_file());
    assert!(!report.output_path.join("bin").exists());

    // Exported metadata names the recipe's link library
    let info: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(report.output_path.join("kiln-info.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(info["libs"], serde_json::json!(["wali"]));
    assert_eq!(info["lib_dirs"], serde_json::json!(["lib"]));
    assert_eq!(info["bin_dirs"], serde_json::json!([]));

    assert_eq!(report.dependencies, vec!["llvm-core/12.0.0".to_string()]);
    assert_eq!(report.patches_applied, 0);
}

#[tokio::test]
async fn test_variants_publish_to_distinct_outputs() {
    let recipe_dir = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();

    let recipe = parse_recipe(
        r#"
metadata:
  name: wali-opennwa
  version: "4.2"
  description: WALi weighted automaton library
  license: not set
package:
  copy:
    - { pattern: "*.a", dst: lib, keep_path: false }
    - { pattern: "*.so", dst: lib, keep_path: false }
"#,
    )
    .unwrap();

    let static_driver = RecordingDriver::with_artifacts(vec![PathBuf::from("libwali.a")]);
    let builder = Builder::new(build_config(work.path()), PackageIndex::empty())
        .with_driver(Box::new(static_driver));
    let static_context = BuildContext::new(&recipe, recipe_dir.path(), linux_static_pic());
    let static_report = builder.build(&recipe, &static_context).await.unwrap();

    let mut shared_variant = linux_static_pic();
    shared_variant.shared = true;
    let shared_driver = RecordingDriver::with_artifacts(vec![PathBuf::from("libwali.so")]);
    let builder = Builder::new(build_config(work.path()), PackageIndex::empty())
        .with_driver(Box::new(shared_driver));
    let shared_context = BuildContext::new(&recipe, recipe_dir.path(), shared_variant);
    let shared_report = builder.build(&recipe, &shared_context).await.unwrap();

    assert_ne!(static_report.output_path, shared_report.output_path);
    assert!(static_report.output_path.join("lib/libwali.a").is_file());
    assert!(shared_report.output_path.join("lib/libwali.so").is_file());
    // The static package never picked up the shared build's artifact
    assert!(!static_report.output_path.join("lib/libwali.so").exists());
}
