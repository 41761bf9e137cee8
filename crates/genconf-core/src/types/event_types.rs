//! Event plugin configuration types
//!
//! The `template` plugin carries a picking mode that decides the shape of
//! its template entries. Each mode is its own variant of
//! [`TemplatePicking`], so fields of one mode cannot appear in another.

use super::one_entry;
use crate::schema::Keyword;
use crate::types::Condition;
use camino::Utf8PathBuf;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Default read buffer of the replay plugin
pub const DEFAULT_CHUNK_SIZE: u64 = 1_048_576;

/// Named event plugin configuration, `{<plugin>: <body>}`
#[derive(Debug, Clone, PartialEq)]
pub enum EventPluginConfig {
    Template(TemplateEventConfig),
    Replay(ReplayEventConfig),
    Script(ScriptEventConfig),
}

impl EventPluginConfig {
    /// Accepted plugin names
    pub const NAMES: &'static [&'static str] = &["template", "replay", "script"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Template(_) => "template",
            Self::Replay(_) => "replay",
            Self::Script(_) => "script",
        }
    }
}

impl Serialize for EventPluginConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Template(c) => map.serialize_entry(self.name(), c)?,
            Self::Replay(c) => map.serialize_entry(self.name(), c)?,
            Self::Script(c) => map.serialize_entry(self.name(), c)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EventPluginConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate_event_plugin(&value).map_err(serde::de::Error::custom)
    }
}

/// Events rendered from Jinja templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateEventConfig {
    /// Values passed to every template
    pub params: Map<String, Value>,
    pub samples: BTreeMap<String, SampleConfig>,
    #[serde(flatten)]
    pub picking: TemplatePicking,
}

/// Template picking strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingMode {
    /// Render every template for each timestamp
    All,
    /// Render one uniformly chosen template
    Any,
    /// Render one template chosen by weight
    Chance,
    /// Render templates in round-robin order
    Spin,
    /// Follow transitions between templates
    Fsm,
    /// Render templates in an explicit order
    Chain,
}

impl Keyword for PickingMode {
    const NAMES: &'static [&'static str] = &["all", "any", "chance", "spin", "fsm", "chain"];

    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "all" => Self::All,
            "any" => Self::Any,
            "chance" => Self::Chance,
            "spin" => Self::Spin,
            "fsm" => Self::Fsm,
            "chain" => Self::Chain,
            _ => return None,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
            Self::Chance => "chance",
            Self::Spin => "spin",
            Self::Fsm => "fsm",
            Self::Chain => "chain",
        }
    }
}

impl fmt::Display for PickingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mode-specific template list, tagged by `mode`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TemplatePicking {
    All {
        templates: Vec<Aliased<TemplateSpec>>,
    },
    Any {
        templates: Vec<Aliased<TemplateSpec>>,
    },
    Chance {
        templates: Vec<Aliased<ChanceTemplateSpec>>,
    },
    Spin {
        templates: Vec<Aliased<TemplateSpec>>,
    },
    Fsm {
        templates: Vec<Aliased<FsmTemplateSpec>>,
    },
    Chain {
        templates: Vec<Aliased<TemplateSpec>>,
        /// Aliases in rendering order
        chain: Vec<String>,
    },
}

impl TemplatePicking {
    pub fn mode(&self) -> PickingMode {
        match self {
            Self::All { .. } => PickingMode::All,
            Self::Any { .. } => PickingMode::Any,
            Self::Chance { .. } => PickingMode::Chance,
            Self::Spin { .. } => PickingMode::Spin,
            Self::Fsm { .. } => PickingMode::Fsm,
            Self::Chain { .. } => PickingMode::Chain,
        }
    }

    /// Declared template aliases, in document order
    pub fn aliases(&self) -> Vec<&str> {
        match self {
            Self::All { templates }
            | Self::Any { templates }
            | Self::Spin { templates }
            | Self::Chain { templates, .. } => templates.iter().map(|t| t.alias.as_str()).collect(),
            Self::Chance { templates } => templates.iter().map(|t| t.alias.as_str()).collect(),
            Self::Fsm { templates } => templates.iter().map(|t| t.alias.as_str()).collect(),
        }
    }

    /// Template file of every entry, in document order
    pub fn template_paths(&self) -> Vec<&Utf8PathBuf> {
        match self {
            Self::All { templates }
            | Self::Any { templates }
            | Self::Spin { templates }
            | Self::Chain { templates, .. } => templates.iter().map(|t| &t.spec.template).collect(),
            Self::Chance { templates } => templates.iter().map(|t| &t.spec.template).collect(),
            Self::Fsm { templates } => templates.iter().map(|t| &t.spec.template).collect(),
        }
    }
}

/// Template entry keyed by its alias, serialized as `{<alias>: <entry>}`
#[derive(Debug, Clone, PartialEq)]
pub struct Aliased<T> {
    pub alias: String,
    pub spec: T,
}

impl<T> Aliased<T> {
    pub fn new(alias: impl Into<String>, spec: T) -> Self {
        Self {
            alias: alias.into(),
            spec,
        }
    }
}

impl<T: Serialize> Serialize for Aliased<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.alias, &self.spec)?;
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Aliased<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (alias, spec) = one_entry::<D, String, T>(deserializer, "template alias")?;
        Ok(Self { alias, spec })
    }
}

/// Template entry of the `all`, `any`, `spin` and `chain` modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// `.jinja` template file
    pub template: Utf8PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanceTemplateSpec {
    pub template: Utf8PathBuf,
    /// Relative weight, greater than zero
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FsmTemplateSpec {
    pub template: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    /// Whether the machine starts in this state
    pub initial: bool,
}

/// FSM edge towards another template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    /// Alias of the destination template
    pub to: String,
    pub when: Condition,
}

/// Sample data made available to templates, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SampleConfig {
    Items {
        source: Vec<Value>,
    },
    Csv {
        source: Utf8PathBuf,
        #[serde(default = "default_delimiter")]
        delimiter: String,
        #[serde(default)]
        header: bool,
    },
    Json {
        source: Utf8PathBuf,
    },
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Discriminant of a [`SampleConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Items,
    Csv,
    Json,
}

impl Keyword for SampleKind {
    const NAMES: &'static [&'static str] = &["items", "csv", "json"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "items" => Some(Self::Items),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Events replayed from an existing log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEventConfig {
    pub path: Utf8PathBuf,
    /// Regex with a `timestamp` named group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_format: Option<String>,
    /// Start over at end of file
    #[serde(default)]
    pub repeat: bool,
    /// Read buffer size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_chunk_size() -> u64 {
    DEFAULT_CHUNK_SIZE
}

pub(crate) fn default_encoding() -> String {
    "utf_8".to_string()
}

/// Events produced by a Python script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEventConfig {
    /// `.py` script
    pub path: Utf8PathBuf,
}
