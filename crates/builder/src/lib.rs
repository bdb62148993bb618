#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Source building and packaging for kiln
//!
//! This crate turns a recipe + variant into a published package: it
//! resolves dependency pins, applies version-keyed patches to a fresh
//! source checkout, delegates configure/compile to a build driver, and
//! copies the resulting artifacts into the canonical package layout.

mod builder;
mod context;
mod drivers;
mod environment;
mod events;
mod export;
mod fileops;
mod packager;
mod patch;
pub mod recipe;

pub use builder::{BuildConfig, Builder};
pub use context::BuildContext;
pub use drivers::{BuildDriver, CMakeDriver};
pub use environment::{BuildCommandResult, BuildEnvironment};
pub use export::{write_package_info, PackageInfo};
pub use fileops::{collect_files_sorted, copy_directory_recursive};
pub use packager::{package, PackageOutput};
pub use patch::apply_patches;
pub use recipe::{load_recipe, parse_recipe, CopyRule, PatchFile, Recipe};
