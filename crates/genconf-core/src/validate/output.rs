//! Output plugin and formatter validation
//!
//! Plugin bodies and formatters are checked against
//! `schemas/output.schema.json`. A formatter is dispatched on `format`
//! and validated on its own, so its errors are reported next to those of
//! the body that holds it.

use crate::schema::{Checker, FieldPath, SchemaFamily};
use crate::types::{
    ClickhouseOutputConfig, FileOutputConfig, FormatKind, FormatterConfig, HttpOutputConfig,
    OpensearchOutputConfig, OutputPluginConfig, StdoutOutputConfig, TemplateSource,
};
use camino::Utf8PathBuf;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub(crate) fn output_plugin(
    ck: &mut Checker,
    value: &Value,
    path: &FieldPath,
) -> Option<OutputPluginConfig> {
    let names = OutputPluginConfig::NAMES;
    let (name, body) = ck.single_entry(value, path, "output plugin", names)?;
    debug!(plugin = name, %path, "validating output plugin");
    let body_path = path.key(name);

    match name {
        "clickhouse" => plugin(ck, name, body, &body_path, |c: &mut ClickhouseOutputConfig| {
            &mut c.formatter
        })
        .map(OutputPluginConfig::Clickhouse),
        "file" => plugin(ck, name, body, &body_path, |c: &mut FileOutputConfig| {
            &mut c.formatter
        })
        .map(OutputPluginConfig::File),
        "http" => plugin(ck, name, body, &body_path, |c: &mut HttpOutputConfig| {
            &mut c.formatter
        })
        .map(OutputPluginConfig::Http),
        "opensearch" => plugin(ck, name, body, &body_path, |c: &mut OpensearchOutputConfig| {
            &mut c.formatter
        })
        .map(OutputPluginConfig::Opensearch),
        "stdout" => plugin(ck, name, body, &body_path, |c: &mut StdoutOutputConfig| {
            &mut c.formatter
        })
        .map(OutputPluginConfig::Stdout),
        other => {
            ck.unknown_variant(path, "output plugin", other, names);
            None
        }
    }
}

/// Body of one plugin; an explicit `formatter` replaces the plugin default
fn plugin<T: DeserializeOwned>(
    ck: &mut Checker,
    name: &str,
    body: &Value,
    path: &FieldPath,
    formatter_of: impl FnOnce(&mut T) -> &mut FormatterConfig,
) -> Option<T> {
    let explicit = body
        .get("formatter")
        .map(|value| formatter(ck, value, &path.key("formatter")));
    let mut config: T = ck.parse(SchemaFamily::Output, name, body, path)?;

    if let Some(explicit) = explicit {
        *formatter_of(&mut config) = explicit?;
    }
    Some(config)
}

/// Union of the fields any formatter may carry
#[derive(Debug, Deserialize)]
struct FormatterFields {
    #[serde(default)]
    indent: u8,
    template: Option<String>,
    template_path: Option<Utf8PathBuf>,
}

impl FormatterFields {
    fn source(self) -> Option<TemplateSource> {
        match (self.template, self.template_path) {
            (Some(template), None) => Some(TemplateSource::Template(template)),
            (None, Some(path)) => Some(TemplateSource::TemplatePath(path)),
            _ => None,
        }
    }
}

pub(crate) fn formatter(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<FormatterConfig> {
    let kind: FormatKind = ck.discriminant(value, path, "format", "format")?;
    let schema = format!("formatter_{}", kind);
    let fields: FormatterFields = ck.parse(SchemaFamily::Output, &schema, value, path)?;

    match kind {
        FormatKind::Plain => Some(FormatterConfig::Plain),
        FormatKind::Json => Some(FormatterConfig::Json {
            indent: fields.indent,
        }),
        FormatKind::JsonBatch => Some(FormatterConfig::JsonBatch {
            indent: fields.indent,
        }),
        FormatKind::Template => fields
            .source()
            .map(|source| FormatterConfig::Template { source }),
        FormatKind::TemplateBatch => fields
            .source()
            .map(|source| FormatterConfig::TemplateBatch { source }),
    }
}
