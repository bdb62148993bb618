//! Per-build context

use crate::recipe::Recipe;
use kiln_events::EventSender;
use kiln_types::VariantKey;
use std::path::{Path, PathBuf};

/// Identity and wiring for one build invocation
///
/// Immutable once constructed; a different variant produces a different
/// context and therefore a distinct build tree and package output.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Package name from the recipe
    pub name: String,
    /// Package version from the recipe
    pub version: String,
    /// Directory containing the recipe and its exported sources
    pub recipe_dir: PathBuf,
    /// The variant being built
    pub variant: VariantKey,
    /// Optional channel for progress events
    pub event_sender: Option<EventSender>,
}

impl BuildContext {
    /// Create a new build context
    #[must_use]
    pub fn new(recipe: &Recipe, recipe_dir: &Path, variant: VariantKey) -> Self {
        Self {
            name: recipe.metadata.name.clone(),
            version: recipe.metadata.version.clone(),
            recipe_dir: recipe_dir.to_path_buf(),
            variant,
            event_sender: None,
        }
    }

    /// Attach an event sender
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Directory name scoping build tree and package output to this
    /// package + version + variant
    #[must_use]
    pub fn scoped_dir_name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.name,
            self.version,
            self.variant.canonical_key()
        )
    }
}
