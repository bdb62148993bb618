//! Recipe and variant validation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RecipeError {
    #[error("recipe parse error: {message}")]
    ParseError { message: String },

    #[error("missing required recipe field: {field}")]
    MissingField { field: String },

    #[error("unknown option: {key}")]
    UnknownOption { key: String },

    #[error("invalid value for option {key}: {value}")]
    InvalidOptionValue { key: String, value: String },

    #[error("value {value} is not allowed for option {key} by this recipe")]
    OptionNotAllowed { key: String, value: String },

    #[error("unknown setting: {key}")]
    UnknownSetting { key: String },

    #[error("unrecognized {setting}: {value}")]
    InvalidSetting { setting: String, value: String },

    #[error("invalid artifact pattern: {pattern}")]
    InvalidPattern { pattern: String },
}

impl UserFacingError for RecipeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownOption { .. } | Self::OptionNotAllowed { .. } => {
                Some("Run `kiln info` to list the options this recipe declares.")
            }
            Self::InvalidOptionValue { .. } => Some("Option values must be `true` or `false`."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ParseError { .. } => "recipe.parse_error",
            Self::MissingField { .. } => "recipe.missing_field",
            Self::UnknownOption { .. } => "recipe.unknown_option",
            Self::InvalidOptionValue { .. } => "recipe.invalid_option_value",
            Self::OptionNotAllowed { .. } => "recipe.option_not_allowed",
            Self::UnknownSetting { .. } => "recipe.unknown_setting",
            Self::InvalidSetting { .. } => "recipe.invalid_setting",
            Self::InvalidPattern { .. } => "recipe.invalid_pattern",
        };
        Some(code)
    }
}
