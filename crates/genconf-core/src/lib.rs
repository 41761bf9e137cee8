//! # genconf-core
//!
//! Core library for genconf providing:
//! - Validation of generator plugin configurations against embedded JSON Schemas
//! - The condition grammar used by FSM transition guards
//! - Typed, normalized configuration values that serialize back to their wire shape
//! - Project file loading and hierarchical settings

pub mod config;
pub mod error;
pub mod schema;
pub mod types;
pub mod utils;
pub mod validate;

pub use config::{HierarchicalSettingsLoader, ProjectFile, Settings};
pub use error::{Error, Result};
pub use schema::{
    ErrorKind, FieldError, FieldPath, SchemaFamily, SchemaRegistry, ValidationErrors,
    ValidationOptions,
};
pub use utils::get_home_dir;
pub use validate::{
    validate_condition, validate_event_plugin, validate_generator, validate_input_plugin,
    validate_output_plugin, validate_plugin, ConfigValidator,
};
