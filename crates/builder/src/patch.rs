//! Source patch application
//!
//! Patches are looked up once per build, keyed by the recipe's own
//! version, and applied in list order through the external `patch(1)`
//! utility. Application is not idempotent, so the environment guarantees
//! a fresh checkout per build. The first failure aborts with no rollback
//! (the tree is disposable).

use crate::context::BuildContext;
use crate::environment::BuildEnvironment;
use crate::events::send_event;
use crate::recipe::Recipe;
use kiln_errors::{BuildError, Error};
use kiln_events::Event;

/// Apply the patches registered for this build's recipe version
///
/// Returns the number of patches applied (zero when the version has no
/// entry in the patch table).
///
/// # Errors
///
/// Returns `BuildError::PatchFailed` naming the first patch that cannot
/// be found or applied, and `BuildError::MissingBuildTool` when the
/// `patch` utility itself is unavailable.
pub async fn apply_patches(
    recipe: &Recipe,
    context: &BuildContext,
    env: &BuildEnvironment,
) -> Result<usize, Error> {
    let patches = recipe.patches_for(&context.version);
    if patches.is_empty() {
        return Ok(0);
    }

    which::which("patch").map_err(|_| BuildError::MissingBuildTool {
        name: "patch".to_string(),
    })?;

    for patch in patches {
        let patch_path = env.source_dir().join(&patch.file);
        if !patch_path.exists() {
            return Err(BuildError::PatchFailed {
                patch: patch.file.clone(),
                message: format!("patch file not found: {}", patch_path.display()),
            }
            .into());
        }

        let working_dir = match &patch.base_dir {
            Some(base) => env.source_dir().join(base),
            None => env.source_dir().to_path_buf(),
        };

        let strip = format!("-p{}", patch.strip);
        let patch_arg = patch_path.display().to_string();
        let result = env
            .execute_command("patch", &[&strip, "-i", &patch_arg], Some(&working_dir))
            .await?;

        if !result.success {
            return Err(BuildError::PatchFailed {
                patch: patch.file.clone(),
                message: format!("{}\n{}", result.stdout, result.stderr),
            }
            .into());
        }

        send_event(
            context,
            Event::PatchApplied {
                patch: patch.file.clone(),
            },
        );
    }

    Ok(patches.len())
}
