//! kiln - source build and packaging tool
//!
//! Builds a native library from a declarative recipe for one variant of
//! the build matrix, publishes the packaged artifacts, and exports link
//! metadata for consumers.

mod cli;
mod display;

use crate::cli::{resolve_variant, BuildArgs, Cli, Commands, InfoArgs};
use crate::display::EventHandler;
use clap::Parser;
use kiln_builder::{load_recipe, BuildConfig, BuildContext, Builder};
use kiln_config::Config;
use kiln_errors::{Error, UserFacingError};
use kiln_index::PackageIndex;
use kiln_types::ColorChoice;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.debug, cli.global.color);

    if let Err(e) = run(cli).await {
        error!("{e}");
        eprintln!("error: {}", e.user_message());
        if let Some(hint) = e.user_hint() {
            eprintln!("hint: {hint}");
        }
        process::exit(1);
    }
}

fn init_tracing(debug: bool, color: ColorChoice) {
    use tracing_subscriber::EnvFilter;

    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let ansi = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stderr().is_terminal(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;

    match cli.command {
        Commands::Build(args) => build(&config, &args, cli.global.json).await,
        Commands::Info(args) => info(&args, cli.global.json).await,
        Commands::Validate { recipe } => validate(&recipe).await,
    }
}

async fn build(config: &Config, args: &BuildArgs, json: bool) -> Result<(), Error> {
    let recipe = load_recipe(&args.recipe).await?;
    let recipe_dir = recipe_dir_of(&args.recipe);

    let variant = resolve_variant(&recipe, args)?;

    let index = match args.index.as_ref().or(config.paths.index_file.as_ref()) {
        Some(path) => PackageIndex::load(path).await?,
        None => PackageIndex::empty(),
    };

    let build_root = args
        .build_root
        .clone()
        .or_else(|| config.paths.build_root.clone())
        .unwrap_or_else(|| std::env::temp_dir().join("kiln"));
    let output_root = args
        .output
        .clone()
        .or_else(|| config.paths.output_root.clone())
        .unwrap_or_else(|| PathBuf::from("packages"));

    let mut build_config = BuildConfig::new(build_root, output_root)
        .with_jobs(args.jobs.unwrap_or(config.build.build_jobs));
    build_config.network_access = config.build.network_access;

    let builder = Builder::new(build_config, index);

    let (sender, receiver) = kiln_events::channel();
    let renderer = tokio::spawn(EventHandler::new(json).run(receiver));

    let context = BuildContext::new(&recipe, &recipe_dir, variant).with_event_sender(sender);
    let result = builder.build(&recipe, &context).await;

    // Drop the last sender so the renderer drains and exits
    drop(context);
    let _ = renderer.await;

    let report = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Published {}/{} ({}) -> {} ({} files)",
            report.name,
            report.version,
            report.variant,
            report.output_path.display(),
            report.file_count()
        );
    }

    Ok(())
}

async fn info(args: &InfoArgs, json: bool) -> Result<(), Error> {
    let recipe = load_recipe(&args.recipe).await?;

    if json {
        let value = serde_json::json!({
            "name": recipe.metadata.name,
            "version": recipe.metadata.version,
            "description": recipe.metadata.description,
            "license": recipe.metadata.license,
            "url": recipe.metadata.url,
            "topics": recipe.metadata.topics,
            "dependencies": recipe.dependencies,
            "default_options": {
                "shared": recipe.default_options.shared,
                "fPIC": recipe.default_options.fpic,
            },
            "libs": recipe.package_info.libs,
            "defines": recipe.package_info.defines,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}/{}", recipe.metadata.name, recipe.metadata.version);
    println!("  {}", recipe.metadata.description);
    println!("  license: {}", recipe.metadata.license);
    if let Some(url) = &recipe.metadata.url {
        println!("  url: {url}");
    }
    if !recipe.dependencies.is_empty() {
        println!("  dependencies:");
        for dep in &recipe.dependencies {
            println!("    {dep}");
        }
    }
    println!(
        "  default options: shared={} fPIC={}",
        recipe.default_options.shared, recipe.default_options.fpic
    );
    if !recipe.package_info.libs.is_empty() {
        println!("  link libraries: {}", recipe.package_info.libs.join(", "));
    }

    Ok(())
}

async fn validate(recipe_path: &Path) -> Result<(), Error> {
    let recipe = load_recipe(recipe_path).await?;
    println!(
        "OK: {}/{} ({} dependencies, {} copy rules)",
        recipe.metadata.name,
        recipe.metadata.version,
        recipe.dependencies.len(),
        recipe.package.copy.len()
    );
    Ok(())
}

fn recipe_dir_of(recipe_path: &Path) -> PathBuf {
    match recipe_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
