//! Schema and resolution errors.

use serde::{Deserialize, Serialize};
use std::io;

/// Failure of a single resolution call. Never retried, never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", content = "detail")]
pub enum ResolveError {
    /// The selection names a group the schema never declared.
    #[serde(rename = "UNKNOWN_GROUP")]
    #[error("Component '{schema}' has no variant group '{group}'")]
    UnknownGroup { schema: String, group: String },

    /// The selected (or defaulted) option is not one of the group's options.
    #[serde(rename = "UNKNOWN_OPTION")]
    #[error("Variant group '{group}' of component '{schema}' has no option '{option}'")]
    UnknownOption {
        schema: String,
        group: String,
        option: String,
    },
}

impl ResolveError {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            ResolveError::UnknownGroup { schema, group } => {
                format!("UNKNOWN_GROUP:{}.{}", schema, group)
            }
            ResolveError::UnknownOption {
                schema,
                group,
                option,
            } => format!("UNKNOWN_OPTION:{}.{}={}", schema, group, option),
        }
    }
}

/// Errors raised while defining or loading a variant schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Component name must not be empty")]
    MissingName,

    #[error("Component '{schema}' declares group '{group}' more than once")]
    DuplicateGroup { schema: String, group: String },

    #[error("Group '{group}' of component '{schema}' declares option '{option}' more than once")]
    DuplicateOption {
        schema: String,
        group: String,
        option: String,
    },

    #[error("Group '{group}' of component '{schema}' has no options")]
    EmptyGroup { schema: String, group: String },

    #[error("Component '{schema}': {context} references unknown group '{group}'")]
    UnknownGroup {
        schema: String,
        context: String,
        group: String,
    },

    #[error("Component '{schema}': {context} references unknown option '{group}={option}'")]
    UnknownOption {
        schema: String,
        context: String,
        group: String,
        option: String,
    },

    #[error("Component '{schema}': {context} lists no options for group '{group}'")]
    EmptyCondition {
        schema: String,
        context: String,
        group: String,
    },

    #[error("Component '{schema}': '{token}' is not a single class token")]
    InvalidToken { schema: String, token: String },

    #[error("Failed to read schema file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse schema TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
