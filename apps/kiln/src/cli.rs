//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use kiln_builder::Recipe;
use kiln_errors::{Error, RecipeError};
use kiln_types::{Arch, BuildType, ColorChoice, Compiler, Os, VariantKey};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kiln", version, about = "Source build and packaging tool")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration file
    #[arg(long, global = true, env = "KILN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a recipe and publish its package
    Build(BuildArgs),

    /// Show recipe metadata and exported link information
    Info(InfoArgs),

    /// Parse and validate a recipe
    Validate {
        /// Recipe file
        #[arg(default_value = "recipe.yaml")]
        recipe: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Recipe file
    #[arg(long, default_value = "recipe.yaml")]
    pub recipe: PathBuf,

    /// Local package index file
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Root for per-variant build trees
    #[arg(long)]
    pub build_root: Option<PathBuf>,

    /// Root for published packages
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Parallel build jobs (0 = auto)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Override a setting, e.g. `-s os=linux -s arch=arm64`
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Override an option, e.g. `-o shared=true`
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Recipe file
    #[arg(long, default_value = "recipe.yaml")]
    pub recipe: PathBuf,
}

/// Resolve the build variant from host defaults, setting overrides, and
/// option overrides
///
/// # Errors
///
/// Returns a `RecipeError` for unknown setting/option keys or values
/// outside the recognized enumerations.
pub fn resolve_variant(recipe: &Recipe, args: &BuildArgs) -> Result<VariantKey, Error> {
    let mut os = Os::host();
    let mut compiler: Option<Compiler> = None;
    let mut arch = Arch::host();
    let mut build_type = BuildType::default();

    for setting in &args.settings {
        let (key, value) = split_pair(setting, "setting")?;
        match key {
            "os" => os = value.parse()?,
            "compiler" => compiler = Some(value.parse()?),
            "arch" => arch = value.parse()?,
            "build_type" => build_type = value.parse()?,
            _ => {
                return Err(RecipeError::UnknownSetting {
                    key: key.to_string(),
                }
                .into())
            }
        }
    }

    let mut overrides = BTreeMap::new();
    for option in &args.options {
        let (key, value) = split_pair(option, "option")?;
        overrides.insert(key.to_string(), value.to_string());
    }
    let (shared, fpic) = recipe.resolve_options(&overrides)?;

    Ok(VariantKey {
        os,
        compiler: compiler.unwrap_or_else(|| Compiler::host_default(os)),
        build_type,
        arch,
        shared,
        fpic,
    })
}

fn split_pair<'a>(input: &'a str, kind: &str) -> Result<(&'a str, &'a str), Error> {
    input.split_once('=').ok_or_else(|| {
        if kind == "setting" {
            RecipeError::UnknownSetting {
                key: input.to_string(),
            }
            .into()
        } else {
            RecipeError::UnknownOption {
                key: input.to_string(),
            }
            .into()
        }
    })
}
