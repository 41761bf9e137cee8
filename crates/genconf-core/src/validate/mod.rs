//! Validators for conditions, plugin configurations and generator documents
//!
//! Every entry point takes a decoded JSON value and returns either the
//! typed value or all errors found, each qualified by its path. Shapes
//! come from the embedded schemas; this module adds what a schema cannot
//! express (alias references, the FSM initial state, regex compilation
//! and the nesting limit).
//!
//! ```
//! use genconf_core::validate::validate_condition;
//! use serde_json::json;
//!
//! let errors = validate_condition(&json!({"and": [{"defined": "locals.x"}]})).unwrap_err();
//! assert_eq!(errors.iter().next().unwrap().path.to_string(), "and");
//! ```

mod condition;
mod event;
mod generator;
mod input;
mod output;

pub use crate::types::DEFAULT_CHUNK_SIZE;

use crate::error::Result;
use crate::schema::{Checker, FieldPath, ValidationErrors, ValidationOptions};
use crate::types::{
    Condition, EventPluginConfig, GeneratorConfig, InputPluginConfig, OutputPluginConfig,
    PluginCategory, PluginConfig, SchemaKind, ValidatedConfig,
};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Global validator instance with default options
static VALIDATOR: OnceLock<ConfigValidator> = OnceLock::new();

/// Reusable validator holding [`ValidationOptions`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigValidator {
    options: ValidationOptions,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Get the global validator instance
    pub fn global() -> &'static ConfigValidator {
        VALIDATOR.get_or_init(ConfigValidator::new)
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    fn run<T>(
        &self,
        value: &Value,
        validate: impl FnOnce(&mut Checker, &Value, &FieldPath) -> Option<T>,
    ) -> std::result::Result<T, ValidationErrors> {
        let mut ck = Checker::new(self.options);
        let out = validate(&mut ck, value, &FieldPath::root());
        let result = ck.finish(out);
        if let Err(errors) = &result {
            debug!(errors = errors.len(), "validation failed");
        }
        result
    }

    pub fn validate_condition(&self, value: &Value) -> std::result::Result<Condition, ValidationErrors> {
        self.run(value, condition::condition)
    }

    pub fn validate_input_plugin(
        &self,
        value: &Value,
    ) -> std::result::Result<InputPluginConfig, ValidationErrors> {
        self.run(value, input::input_plugin)
    }

    pub fn validate_event_plugin(
        &self,
        value: &Value,
    ) -> std::result::Result<EventPluginConfig, ValidationErrors> {
        self.run(value, event::event_plugin)
    }

    pub fn validate_output_plugin(
        &self,
        value: &Value,
    ) -> std::result::Result<OutputPluginConfig, ValidationErrors> {
        self.run(value, output::output_plugin)
    }

    /// Validate a named config of the given category
    pub fn validate_plugin(
        &self,
        category: PluginCategory,
        value: &Value,
    ) -> std::result::Result<PluginConfig, ValidationErrors> {
        match category {
            PluginCategory::Input => self.validate_input_plugin(value).map(PluginConfig::Input),
            PluginCategory::Event => self.validate_event_plugin(value).map(PluginConfig::Event),
            PluginCategory::Output => self.validate_output_plugin(value).map(PluginConfig::Output),
        }
    }

    pub fn validate_generator(
        &self,
        value: &Value,
    ) -> std::result::Result<GeneratorConfig, ValidationErrors> {
        self.run(value, generator::generator)
    }

    /// Validate a decoded document against a schema kind
    pub fn validate(
        &self,
        kind: SchemaKind,
        value: &Value,
    ) -> std::result::Result<ValidatedConfig, ValidationErrors> {
        debug!(%kind, "validating document");
        match (kind, kind.category()) {
            (_, Some(category)) => self.validate_plugin(category, value).map(ValidatedConfig::Plugin),
            (SchemaKind::Condition, None) => {
                self.validate_condition(value).map(ValidatedConfig::Condition)
            }
            (_, None) => self.validate_generator(value).map(ValidatedConfig::Generator),
        }
    }

    /// Parse YAML content and validate it
    pub fn validate_yaml(&self, kind: SchemaKind, yaml: &str) -> Result<ValidatedConfig> {
        let value: Value = serde_yaml_ng::from_str(yaml)?;
        Ok(self.validate(kind, &value)?)
    }

    /// Parse JSON content and validate it
    pub fn validate_json(&self, kind: SchemaKind, json: &str) -> Result<ValidatedConfig> {
        let value: Value = serde_json::from_str(json)?;
        Ok(self.validate(kind, &value)?)
    }
}

pub fn validate_condition(value: &Value) -> std::result::Result<Condition, ValidationErrors> {
    ConfigValidator::global().validate_condition(value)
}

pub fn validate_input_plugin(
    value: &Value,
) -> std::result::Result<InputPluginConfig, ValidationErrors> {
    ConfigValidator::global().validate_input_plugin(value)
}

pub fn validate_event_plugin(
    value: &Value,
) -> std::result::Result<EventPluginConfig, ValidationErrors> {
    ConfigValidator::global().validate_event_plugin(value)
}

pub fn validate_output_plugin(
    value: &Value,
) -> std::result::Result<OutputPluginConfig, ValidationErrors> {
    ConfigValidator::global().validate_output_plugin(value)
}

pub fn validate_plugin(
    category: PluginCategory,
    value: &Value,
) -> std::result::Result<PluginConfig, ValidationErrors> {
    ConfigValidator::global().validate_plugin(category, value)
}

pub fn validate_generator(value: &Value) -> std::result::Result<GeneratorConfig, ValidationErrors> {
    ConfigValidator::global().validate_generator(value)
}
