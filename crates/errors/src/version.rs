//! Version parsing error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VersionError {
    #[error("version parse error: {message}")]
    ParseError { message: String },

    #[error("invalid version spec: {input}")]
    InvalidSpec { input: String },
}
