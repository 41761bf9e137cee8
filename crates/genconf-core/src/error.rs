//! Error types for genconf-core

use crate::schema::ValidationErrors;
use thiserror::Error;

/// Result type alias using genconf-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for genconf
#[derive(Error, Debug)]
pub enum Error {
    /// Project file not found
    #[error("Project file not found: {path}")]
    ConfigNotFound { path: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The document was parsed but does not conform to the schema
    #[error("Validation failed with {} error(s):\n{}", .0.len(), .0)]
    Validation(#[from] ValidationErrors),

    /// No embedded schema under this name
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// An embedded schema failed to compile
    #[error("Failed to compile schema {name}: {message}")]
    SchemaCompile { name: String, message: String },

    /// Settings file or environment override is malformed
    #[error("Invalid settings: {message}")]
    InvalidSettings { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Create a schema compilation error
    pub fn schema_compile(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaCompile {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid settings error
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
