//! Input plugin validation
//!
//! Every input body has its own definition in `schemas/input.schema.json`.

use crate::schema::{Checker, FieldPath, SchemaFamily};
use crate::types::InputPluginConfig;
use serde_json::Value;
use tracing::debug;

pub(crate) fn input_plugin(
    ck: &mut Checker,
    value: &Value,
    path: &FieldPath,
) -> Option<InputPluginConfig> {
    let names = InputPluginConfig::NAMES;
    let (name, body) = ck.single_entry(value, path, "input plugin", names)?;
    debug!(plugin = name, %path, "validating input plugin");
    let body_path = path.key(name);
    let family = SchemaFamily::Input;

    match name {
        "cron" => ck.parse(family, name, body, &body_path).map(InputPluginConfig::Cron),
        "http" => ck.parse(family, name, body, &body_path).map(InputPluginConfig::Http),
        "linspace" => ck.parse(family, name, body, &body_path).map(InputPluginConfig::Linspace),
        "static" => ck.parse(family, name, body, &body_path).map(InputPluginConfig::Static),
        "time_patterns" => ck
            .parse(family, name, body, &body_path)
            .map(InputPluginConfig::TimePatterns),
        "timer" => ck.parse(family, name, body, &body_path).map(InputPluginConfig::Timer),
        "timestamps" => ck
            .parse(family, name, body, &body_path)
            .map(InputPluginConfig::Timestamps),
        other => {
            ck.unknown_variant(path, "input plugin", other, names);
            None
        }
    }
}
