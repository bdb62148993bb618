//! Recipe model and parser

pub mod model;
pub mod parser;

pub use model::{
    CopyRule, DefaultOptions, Metadata, OptionsDecl, PackageInfoDecl, PackageRules, PatchFile,
    Recipe,
};
pub use parser::{load_recipe, parse_recipe};
