//! Packaging error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PackageError {
    #[error("required artifact matched no files: {pattern}")]
    MissingArtifact { pattern: String },

    #[error("staging failed: {message}")]
    StageFailed { message: String },

    #[error("publish failed: {message}")]
    PublishFailed { message: String },
}

impl UserFacingError for PackageError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingArtifact { .. } => {
                Some("Check that the build produced the artifact, or mark the rule best-effort.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingArtifact { .. } => "package.missing_artifact",
            Self::StageFailed { .. } => "package.stage_failed",
            Self::PublishFailed { .. } => "package.publish_failed",
        };
        Some(code)
    }
}
