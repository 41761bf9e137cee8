//! Input plugin configuration types
//!
//! Input plugins produce the timestamps a generator turns into events.

use camino::Utf8PathBuf;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Named input plugin configuration, `{<plugin>: <body>}`
#[derive(Debug, Clone, PartialEq)]
pub enum InputPluginConfig {
    Cron(CronInputConfig),
    Http(HttpInputConfig),
    Linspace(LinspaceInputConfig),
    Static(StaticInputConfig),
    TimePatterns(TimePatternsInputConfig),
    Timer(TimerInputConfig),
    Timestamps(TimestampsInputConfig),
}

impl InputPluginConfig {
    /// Accepted plugin names
    pub const NAMES: &'static [&'static str] = &[
        "cron",
        "http",
        "linspace",
        "static",
        "time_patterns",
        "timer",
        "timestamps",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cron(_) => "cron",
            Self::Http(_) => "http",
            Self::Linspace(_) => "linspace",
            Self::Static(_) => "static",
            Self::TimePatterns(_) => "time_patterns",
            Self::Timer(_) => "timer",
            Self::Timestamps(_) => "timestamps",
        }
    }

    /// Tags attached to every timestamp this plugin produces
    pub fn tags(&self) -> &[String] {
        match self {
            Self::Cron(c) => &c.tags,
            Self::Http(c) => &c.tags,
            Self::Linspace(c) => &c.tags,
            Self::Static(c) => &c.tags,
            Self::TimePatterns(c) => &c.tags,
            Self::Timer(c) => &c.tags,
            Self::Timestamps(c) => &c.tags,
        }
    }
}

impl Serialize for InputPluginConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Cron(c) => map.serialize_entry(self.name(), c)?,
            Self::Http(c) => map.serialize_entry(self.name(), c)?,
            Self::Linspace(c) => map.serialize_entry(self.name(), c)?,
            Self::Static(c) => map.serialize_entry(self.name(), c)?,
            Self::TimePatterns(c) => map.serialize_entry(self.name(), c)?,
            Self::Timer(c) => map.serialize_entry(self.name(), c)?,
            Self::Timestamps(c) => map.serialize_entry(self.name(), c)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InputPluginConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate_input_plugin(&value).map_err(serde::de::Error::custom)
    }
}

/// Timestamps on a cron schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronInputConfig {
    /// Cron expression with 5 or 6 fields
    pub expression: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Timestamps pushed by HTTP clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpInputConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_pending_requests")]
    pub max_pending_requests: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_max_pending_requests() -> u64 {
    100
}

fn default_endpoint() -> bool {
    true
}

/// `count` evenly spaced timestamps between `start` and `end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinspaceInputConfig {
    pub start: String,
    pub end: String,
    pub count: u64,
    /// Whether `end` itself is produced
    #[serde(default = "default_endpoint")]
    pub endpoint: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `count` copies of the current time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticInputConfig {
    pub count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Timestamps sampled from pattern files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePatternsInputConfig {
    /// `.yml`/`.yaml` pattern files
    pub patterns: Vec<Utf8PathBuf>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerInputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Interval between ticks
    pub seconds: f64,
    /// Timestamps produced per tick
    pub count: u64,
    /// Number of ticks; unlimited when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Explicit list of timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampsInputConfig {
    pub source: TimestampsSource,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Inline timestamps or a file containing one per line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampsSource {
    Inline(Vec<String>),
    Path(Utf8PathBuf),
}
