//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("build failed: {message}")]
    Failed { message: String },

    #[error("missing build tool: {name}")]
    MissingBuildTool { name: String },

    #[error("patch failed: {patch}: {message}")]
    PatchFailed { patch: String, message: String },

    #[error("configure failed: {message}")]
    ConfigureFailed { message: String },

    #[error("compile failed: {message}")]
    CompileFailed { message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingBuildTool { .. } => {
                Some("Install the missing tool and make sure it is on PATH.")
            }
            Self::PatchFailed { .. } => {
                Some("Update the patch so it applies cleanly to a fresh checkout.")
            }
            Self::ConfigureFailed { .. } | Self::CompileFailed { .. } => {
                Some("The full output of the build tool is included above.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "build.failed",
            Self::MissingBuildTool { .. } => "build.missing_build_tool",
            Self::PatchFailed { .. } => "build.patch_failed",
            Self::ConfigureFailed { .. } => "build.configure_failed",
            Self::CompileFailed { .. } => "build.compile_failed",
        };
        Some(code)
    }
}
