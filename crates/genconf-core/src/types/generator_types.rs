//! Generator documents and validation targets

use crate::schema::Keyword;
use crate::types::{
    Condition, EventPluginConfig, InputPluginConfig, OutputPluginConfig, TemplatePicking,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Complete generator definition: inputs, one event plugin and outputs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorConfig {
    pub input: Vec<InputPluginConfig>,
    pub event: EventPluginConfig,
    pub output: Vec<OutputPluginConfig>,
}

impl<'de> Deserialize<'de> for GeneratorConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate_generator(&value).map_err(serde::de::Error::custom)
    }
}

/// Pipeline stage a plugin belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginCategory {
    Input,
    Event,
    Output,
}

impl Keyword for PluginCategory {
    const NAMES: &'static [&'static str] = &["input", "event", "output"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "input" => Some(Self::Input),
            "event" => Some(Self::Event),
            "output" => Some(Self::Output),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Event => "event",
            Self::Output => "output",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A plugin configuration of any category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PluginConfig {
    Input(InputPluginConfig),
    Event(EventPluginConfig),
    Output(OutputPluginConfig),
}

impl PluginConfig {
    pub fn category(&self) -> PluginCategory {
        match self {
            Self::Input(_) => PluginCategory::Input,
            Self::Event(_) => PluginCategory::Event,
            Self::Output(_) => PluginCategory::Output,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Input(c) => c.name(),
            Self::Event(c) => c.name(),
            Self::Output(c) => c.name(),
        }
    }
}

/// Shape a document is validated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    #[default]
    Generator,
    Input,
    Event,
    Output,
    Condition,
}

impl SchemaKind {
    /// Plugin category for the plugin kinds
    pub fn category(&self) -> Option<PluginCategory> {
        match self {
            Self::Input => Some(PluginCategory::Input),
            Self::Event => Some(PluginCategory::Event),
            Self::Output => Some(PluginCategory::Output),
            Self::Generator | Self::Condition => None,
        }
    }
}

impl Keyword for SchemaKind {
    const NAMES: &'static [&'static str] = &["generator", "input", "event", "output", "condition"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "generator" => Some(Self::Generator),
            "input" => Some(Self::Input),
            "event" => Some(Self::Event),
            "output" => Some(Self::Output),
            "condition" => Some(Self::Condition),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Input => "input",
            Self::Event => "event",
            Self::Output => "output",
            Self::Condition => "condition",
        }
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(&s.to_lowercase()).ok_or_else(|| {
            format!(
                "unknown schema kind '{}', expected one of: {}",
                s,
                Self::NAMES.join(", ")
            )
        })
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized result of a successful validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValidatedConfig {
    Generator(GeneratorConfig),
    Plugin(PluginConfig),
    Condition(Condition),
}

impl ValidatedConfig {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Generator(_) => SchemaKind::Generator,
            Self::Plugin(plugin) => match plugin.category() {
                PluginCategory::Input => SchemaKind::Input,
                PluginCategory::Event => SchemaKind::Event,
                PluginCategory::Output => SchemaKind::Output,
            },
            Self::Condition(_) => SchemaKind::Condition,
        }
    }

    /// Key/value overview used by `genconf show`
    pub fn summary(&self) -> Vec<(String, String)> {
        let mut rows = vec![("Kind".to_string(), self.kind().to_string())];

        match self {
            Self::Generator(generator) => {
                let inputs: Vec<&str> = generator.input.iter().map(|i| i.name()).collect();
                let outputs: Vec<&str> = generator.output.iter().map(|o| o.name()).collect();
                rows.push(("Inputs".to_string(), inputs.join(", ")));
                rows.push(("Event".to_string(), event_summary(&generator.event)));
                rows.extend(template_row(&generator.event));
                rows.push(("Outputs".to_string(), outputs.join(", ")));
            }
            Self::Plugin(PluginConfig::Event(event)) => {
                rows.push(("Plugin".to_string(), event_summary(event)));
                rows.extend(template_row(event));
            }
            Self::Plugin(plugin) => {
                rows.push(("Plugin".to_string(), plugin.name().to_string()));
            }
            Self::Condition(condition) => {
                let fields: Vec<String> = condition
                    .state_fields()
                    .iter()
                    .map(|f| f.to_string())
                    .collect();
                rows.push(("Root".to_string(), condition.kind().to_string()));
                rows.push(("Depth".to_string(), condition.depth().to_string()));
                rows.push(("State fields".to_string(), fields.join(", ")));
            }
        }

        rows
    }
}

fn event_summary(event: &EventPluginConfig) -> String {
    match event {
        EventPluginConfig::Template(template) => {
            let picking: &TemplatePicking = &template.picking;
            format!(
                "template ({} mode, {} template(s))",
                picking.mode(),
                picking.aliases().len()
            )
        }
        other => other.name().to_string(),
    }
}

/// Distinct template files, in first-use order
fn template_row(event: &EventPluginConfig) -> Option<(String, String)> {
    let EventPluginConfig::Template(template) = event else {
        return None;
    };
    let mut files: Vec<&str> = Vec::new();
    for path in template.picking.template_paths() {
        if !files.contains(&path.as_str()) {
            files.push(path.as_str());
        }
    }
    Some(("Templates".to_string(), files.join(", ")))
}
