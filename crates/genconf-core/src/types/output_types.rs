//! Output plugin configuration types

use super::event_types::default_encoding;
use crate::schema::Keyword;
use camino::Utf8PathBuf;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Named output plugin configuration, `{<plugin>: <body>}`
#[derive(Debug, Clone, PartialEq)]
pub enum OutputPluginConfig {
    Clickhouse(ClickhouseOutputConfig),
    File(FileOutputConfig),
    Http(HttpOutputConfig),
    Opensearch(OpensearchOutputConfig),
    Stdout(StdoutOutputConfig),
}

impl OutputPluginConfig {
    /// Accepted plugin names
    pub const NAMES: &'static [&'static str] =
        &["clickhouse", "file", "http", "opensearch", "stdout"];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Clickhouse(_) => "clickhouse",
            Self::File(_) => "file",
            Self::Http(_) => "http",
            Self::Opensearch(_) => "opensearch",
            Self::Stdout(_) => "stdout",
        }
    }

    pub fn formatter(&self) -> &FormatterConfig {
        match self {
            Self::Clickhouse(c) => &c.formatter,
            Self::File(c) => &c.formatter,
            Self::Http(c) => &c.formatter,
            Self::Opensearch(c) => &c.formatter,
            Self::Stdout(c) => &c.formatter,
        }
    }
}

impl Serialize for OutputPluginConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Clickhouse(c) => map.serialize_entry(self.name(), c)?,
            Self::File(c) => map.serialize_entry(self.name(), c)?,
            Self::Http(c) => map.serialize_entry(self.name(), c)?,
            Self::Opensearch(c) => map.serialize_entry(self.name(), c)?,
            Self::Stdout(c) => map.serialize_entry(self.name(), c)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OutputPluginConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        crate::validate::validate_output_plugin(&value).map_err(serde::de::Error::custom)
    }
}

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl Keyword for $name {
            const NAMES: &'static [&'static str] = &[$($text),+];

            fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

keyword_enum!(
    /// ClickHouse HTTP interface scheme
    Protocol { Http => "http", Https => "https" }
);

keyword_enum!(
    /// How the output file is opened
    WriteMode { Append => "append", Overwrite => "overwrite" }
);

keyword_enum!(
    HttpMethod {
        Get => "GET",
        Post => "POST",
        Put => "PUT",
        Patch => "PATCH",
        Delete => "DELETE",
    }
);

keyword_enum!(
    /// Standard stream written by the `stdout` plugin
    Stream { Stdout => "stdout", Stderr => "stderr" }
);

keyword_enum!(
    /// Discriminant of a [`FormatterConfig`]
    FormatKind {
        Plain => "plain",
        Json => "json",
        JsonBatch => "json-batch",
        Template => "template",
        TemplateBatch => "template-batch",
    }
);

/// How events are rendered before being written, tagged by `format`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "format")]
pub enum FormatterConfig {
    /// Events written as-is
    #[default]
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "json")]
    Json { indent: u8 },
    /// Whole batch as one JSON array
    #[serde(rename = "json-batch")]
    JsonBatch { indent: u8 },
    #[serde(rename = "template")]
    Template {
        #[serde(flatten)]
        source: TemplateSource,
    },
    /// Whole batch rendered by one template
    #[serde(rename = "template-batch")]
    TemplateBatch {
        #[serde(flatten)]
        source: TemplateSource,
    },
}

impl FormatterConfig {
    pub fn kind(&self) -> FormatKind {
        match self {
            Self::Plain => FormatKind::Plain,
            Self::Json { .. } => FormatKind::Json,
            Self::JsonBatch { .. } => FormatKind::JsonBatch,
            Self::Template { .. } => FormatKind::Template,
            Self::TemplateBatch { .. } => FormatKind::TemplateBatch,
        }
    }

    pub(crate) fn json() -> Self {
        Self::Json { indent: 0 }
    }
}

/// Inline template text or a `.jinja` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSource {
    Template(String),
    TemplatePath(Utf8PathBuf),
}

// Bodies are read from documents that already conform to their schema.
// `formatter` is validated on its own and filled in afterwards.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickhouseOutputConfig {
    pub host: String,
    #[serde(default = "default_clickhouse_port")]
    pub port: u16,
    #[serde(default = "default_protocol")]
    pub protocol: Protocol,
    #[serde(default = "default_account")]
    pub database: String,
    pub table: String,
    #[serde(default = "default_account")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip_deserializing, default = "FormatterConfig::json")]
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOutputConfig {
    pub path: Utf8PathBuf,
    #[serde(default = "default_write_mode")]
    pub write_mode: WriteMode,
    /// Seconds between flushes
    #[serde(default = "default_flush_interval")]
    pub flush_interval: f64,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Written after every event
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(skip_deserializing)]
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOutputConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: HttpMethod,
    /// Status code that marks a request as delivered
    #[serde(default = "default_success_code")]
    pub success_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Verify TLS certificates
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// Seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: f64,
    #[serde(skip_deserializing, default = "FormatterConfig::json")]
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpensearchOutputConfig {
    pub hosts: Vec<String>,
    pub username: String,
    pub password: String,
    pub index: String,
    #[serde(default = "default_verify")]
    pub verify: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: f64,
    #[serde(skip_deserializing, default = "FormatterConfig::json")]
    pub formatter: FormatterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StdoutOutputConfig {
    #[serde(default = "default_stream")]
    pub stream: Stream,
    #[serde(default = "default_flush_interval")]
    pub flush_interval: f64,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(skip_deserializing)]
    pub formatter: FormatterConfig,
}

fn default_clickhouse_port() -> u16 {
    8123
}

fn default_protocol() -> Protocol {
    Protocol::Http
}

fn default_account() -> String {
    "default".to_string()
}

fn default_write_mode() -> WriteMode {
    WriteMode::Append
}

fn default_flush_interval() -> f64 {
    1.0
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_method() -> HttpMethod {
    HttpMethod::Post
}

fn default_success_code() -> u16 {
    201
}

fn default_verify() -> bool {
    true
}

fn default_request_timeout() -> f64 {
    30.0
}

fn default_stream() -> Stream {
    Stream::Stdout
}
