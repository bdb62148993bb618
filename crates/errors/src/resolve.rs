//! Dependency resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("unresolved dependency: {spec}")]
    UnresolvedDependency { spec: String },

    #[error("invalid dependency spec: {spec} (expected <name>/<version>)")]
    InvalidDependencySpec { spec: String },

    #[error("package index not found: {path}")]
    IndexNotFound { path: String },

    #[error("package index parse error: {message}")]
    IndexParseError { message: String },
}

impl UserFacingError for ResolveError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnresolvedDependency { .. } => {
                Some("Install the dependency at the pinned version, then rebuild.")
            }
            Self::IndexNotFound { .. } => {
                Some("Point --index at an index file or create one with an empty package list.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::UnresolvedDependency { .. } => "resolve.unresolved_dependency",
            Self::InvalidDependencySpec { .. } => "resolve.invalid_dependency_spec",
            Self::IndexNotFound { .. } => "resolve.index_not_found",
            Self::IndexParseError { .. } => "resolve.index_parse_error",
        };
        Some(code)
    }
}
