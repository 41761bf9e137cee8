//! Event plugin validation
//!
//! The template plugin is validated in two passes. The first pass
//! dispatches on `mode` and checks the body against the schema of that
//! mode. The second pass runs on the typed value and checks that aliases
//! referenced by `chain` and `transition.to` are declared.

use super::condition::{condition, regex_error_summary};
use crate::schema::{Checker, ErrorKind, FieldPath, Keyword, SchemaFamily};
use crate::types::{
    Aliased, EventPluginConfig, FsmTemplateSpec, PickingMode, ReplayEventConfig, SampleConfig,
    SampleKind, TemplateEventConfig, TemplatePicking, Transition,
};
use camino::Utf8PathBuf;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub(crate) fn event_plugin(
    ck: &mut Checker,
    value: &Value,
    path: &FieldPath,
) -> Option<EventPluginConfig> {
    let names = EventPluginConfig::NAMES;
    let (name, body) = ck.single_entry(value, path, "event plugin", names)?;
    debug!(plugin = name, %path, "validating event plugin");
    let body_path = path.key(name);

    match name {
        "template" => template(ck, body, &body_path).map(EventPluginConfig::Template),
        "replay" => replay(ck, body, &body_path).map(EventPluginConfig::Replay),
        "script" => ck
            .parse(SchemaFamily::Event, name, body, &body_path)
            .map(EventPluginConfig::Script),
        other => {
            ck.unknown_variant(path, "event plugin", other, names);
            None
        }
    }
}

fn template(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<TemplateEventConfig> {
    // Samples do not depend on the mode, so they are checked even without one
    let samples = match value.get("samples") {
        Some(Value::Object(map)) => samples(ck, map, &path.key("samples")),
        _ => Some(BTreeMap::new()),
    };

    let mode: PickingMode = ck.discriminant(value, path, "mode", "picking mode")?;
    debug!(%mode, %path, "validating template picking");
    let schema = format!("template_{}", mode);
    if !ck.conform(SchemaFamily::Event, &schema, value, path) {
        return None;
    }

    let params = match value.get("params") {
        Some(params) => ck.typed::<Map<String, Value>>(params, &path.key("params")),
        None => Some(Map::new()),
    };
    let picking = picking(ck, value, path, mode);

    let config = TemplateEventConfig {
        params: params?,
        samples: samples?,
        picking: picking?,
    };
    cross_reference(ck, &config.picking, path);
    Some(config)
}

fn picking(
    ck: &mut Checker,
    body: &Value,
    path: &FieldPath,
    mode: PickingMode,
) -> Option<TemplatePicking> {
    let templates = &body["templates"];
    let templates_path = path.key("templates");

    Some(match mode {
        PickingMode::All => TemplatePicking::All {
            templates: ck.typed(templates, &templates_path)?,
        },
        PickingMode::Any => TemplatePicking::Any {
            templates: ck.typed(templates, &templates_path)?,
        },
        PickingMode::Spin => TemplatePicking::Spin {
            templates: ck.typed(templates, &templates_path)?,
        },
        PickingMode::Chance => TemplatePicking::Chance {
            templates: ck.typed(templates, &templates_path)?,
        },
        PickingMode::Fsm => TemplatePicking::Fsm {
            templates: fsm_templates(ck, templates, &templates_path)?,
        },
        PickingMode::Chain => TemplatePicking::Chain {
            templates: ck.typed(templates, &templates_path)?,
            chain: ck.typed(&body["chain"], &path.key("chain"))?,
        },
    })
}

/// FSM entry before its guard condition is validated
#[derive(Debug, Deserialize)]
struct FsmEntry {
    template: Utf8PathBuf,
    #[serde(default)]
    initial: bool,
    transition: Option<TransitionEntry>,
}

#[derive(Debug, Deserialize)]
struct TransitionEntry {
    to: String,
    when: Value,
}

fn fsm_templates(
    ck: &mut Checker,
    value: &Value,
    path: &FieldPath,
) -> Option<Vec<Aliased<FsmTemplateSpec>>> {
    let entries: Vec<Aliased<FsmEntry>> = ck.typed(value, path)?;
    let mut out = Vec::with_capacity(entries.len());
    let mut valid = true;

    for (index, entry) in entries.into_iter().enumerate() {
        let Aliased { alias, spec } = entry;
        let transition = match spec.transition {
            Some(TransitionEntry { to, when }) => {
                let when_path = path
                    .index(index)
                    .key(alias.as_str())
                    .key("transition")
                    .key("when");
                match condition(ck, &when, &when_path) {
                    Some(when) => Some(Transition { to, when }),
                    None => {
                        valid = false;
                        continue;
                    }
                }
            }
            None => None,
        };

        out.push(Aliased::new(
            alias,
            FsmTemplateSpec {
                template: spec.template,
                transition,
                initial: spec.initial,
            },
        ));
    }

    valid.then_some(out)
}

fn samples(
    ck: &mut Checker,
    map: &Map<String, Value>,
    path: &FieldPath,
) -> Option<BTreeMap<String, SampleConfig>> {
    let mut out = BTreeMap::new();
    let mut valid = true;

    for (name, sample_value) in map {
        match sample(ck, sample_value, &path.key(name.as_str())) {
            Some(config) => {
                out.insert(name.clone(), config);
            }
            None => valid = false,
        }
    }

    valid.then_some(out)
}

fn sample(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<SampleConfig> {
    let kind: SampleKind = ck.discriminant(value, path, "type", "sample type")?;
    let schema = format!("sample_{}", kind.name());
    ck.parse(SchemaFamily::Event, &schema, value, path)
}

/// Alias checks that need the whole template list
fn cross_reference(ck: &mut Checker, picking: &TemplatePicking, path: &FieldPath) {
    let templates_path = path.key("templates");
    let aliases = picking.aliases();
    let mut declared = HashSet::new();

    for (index, alias) in aliases.iter().enumerate() {
        if !declared.insert(*alias) {
            ck.report(
                &templates_path.index(index).key(*alias),
                ErrorKind::Constraint,
                format!("duplicate template alias '{}'", alias),
            );
        }
    }

    let undeclared = |alias: &str| {
        format!(
            "unknown template alias '{}', declared aliases: {}",
            alias,
            aliases.join(", ")
        )
    };

    match picking {
        TemplatePicking::Chain { chain, .. } => {
            for (index, alias) in chain.iter().enumerate() {
                if !declared.contains(alias.as_str()) {
                    ck.report(
                        &path.key("chain").index(index),
                        ErrorKind::InvalidReference,
                        undeclared(alias.as_str()),
                    );
                }
            }
        }
        TemplatePicking::Fsm { templates } => {
            for (index, entry) in templates.iter().enumerate() {
                let Some(transition) = &entry.spec.transition else {
                    continue;
                };
                if !declared.contains(transition.to.as_str()) {
                    let to_path = templates_path
                        .index(index)
                        .key(entry.alias.as_str())
                        .key("transition")
                        .key("to");
                    ck.report(
                        &to_path,
                        ErrorKind::InvalidReference,
                        undeclared(transition.to.as_str()),
                    );
                }
            }

            let initial = templates.iter().filter(|t| t.spec.initial).count();
            if initial != 1 {
                ck.report(
                    &templates_path,
                    ErrorKind::Constraint,
                    format!(
                        "fsm mode requires exactly one template with 'initial: true', found {}",
                        initial
                    ),
                );
            }
        }
        _ => {}
    }
}

/// The pattern must compile and declare a `timestamp` group
fn timestamp_pattern(ck: &mut Checker, pattern: &str, path: &FieldPath) -> bool {
    let regex = match fancy_regex::Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            ck.report(
                path,
                ErrorKind::Constraint,
                format!("invalid regular expression: {}", regex_error_summary(&e.to_string())),
            );
            return false;
        }
    };

    if !regex.capture_names().flatten().any(|name| name == "timestamp") {
        ck.report(
            path,
            ErrorKind::Constraint,
            "pattern must declare a named group 'timestamp', e.g. '(?P<timestamp>...)'",
        );
        return false;
    }
    true
}

fn replay(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<ReplayEventConfig> {
    let pattern_ok = match value.get("timestamp_pattern") {
        Some(Value::String(pattern)) if !pattern.is_empty() => {
            timestamp_pattern(ck, pattern, &path.key("timestamp_pattern"))
        }
        _ => true,
    };

    let config: ReplayEventConfig = ck.parse(SchemaFamily::Event, "replay", value, path)?;
    pattern_ok.then_some(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ValidationErrors, ValidationOptions};
    use serde_json::json;

    fn check(value: Value) -> Result<EventPluginConfig, ValidationErrors> {
        let mut ck = Checker::new(ValidationOptions::default());
        let out = event_plugin(&mut ck, &value, &FieldPath::root());
        ck.finish(out)
    }

    fn template_config(config: EventPluginConfig) -> TemplateEventConfig {
        match config {
            EventPluginConfig::Template(template) => template,
            other => panic!("expected template plugin, got {}", other.name()),
        }
    }

    #[test]
    fn test_general_modes_accept_plain_entries() {
        for mode in ["all", "any", "spin"] {
            let config = check(json!({"template": {
                "mode": mode,
                "templates": [{"a": {"template": "a.jinja"}}],
            }}))
            .unwrap();
            assert_eq!(template_config(config).picking.mode().to_string(), mode);
        }
    }

    #[test]
    fn test_chance_entry_rules() {
        let entry = |extra: Value| {
            let mut spec = json!({"template": "a.jinja"});
            if let Value::Object(extra) = extra {
                spec.as_object_mut().unwrap().extend(extra);
            }
            json!({"template": {"mode": "chance", "templates": [{"a": spec}]}})
        };

        let errors = check(entry(json!({}))).unwrap_err();
        assert!(errors.has("template.templates[0].a.chance", ErrorKind::MissingField));

        let errors = check(entry(json!({"chance": 0}))).unwrap_err();
        assert!(errors.has("template.templates[0].a.chance", ErrorKind::Constraint));

        assert!(check(entry(json!({"chance": 1.5}))).is_ok());
    }

    #[test]
    fn test_chance_field_outside_chance_mode_is_unknown() {
        let errors = check(json!({"template": {
            "mode": "all",
            "templates": [{"a": {"template": "a.jinja", "chance": 2}}],
        }}))
        .unwrap_err();
        assert!(errors.has("template.templates[0].a.chance", ErrorKind::UnknownField));
    }

    #[test]
    fn test_chain_mode_requires_chain() {
        let base = |chain: Option<Value>| {
            let mut body = json!({"mode": "chain", "templates": [{"a": {"template": "a.jinja"}}]});
            if let Some(chain) = chain {
                body["chain"] = chain;
            }
            json!({"template": body})
        };

        let errors = check(base(None)).unwrap_err();
        assert!(errors.has("template.chain", ErrorKind::MissingField));

        let errors = check(base(Some(json!([])))).unwrap_err();
        assert!(errors.has("template.chain", ErrorKind::Constraint));

        assert!(check(base(Some(json!(["a"])))).is_ok());

        let errors = check(base(Some(json!(["a", "b"])))).unwrap_err();
        assert!(errors.has("template.chain[1]", ErrorKind::InvalidReference));
    }

    #[test]
    fn test_chain_outside_chain_mode_is_unknown() {
        let errors = check(json!({"template": {
            "mode": "spin",
            "templates": [{"a": {"template": "a.jinja"}}],
            "chain": ["a"],
        }}))
        .unwrap_err();
        assert!(errors.has("template.chain", ErrorKind::UnknownField));
    }

    #[test]
    fn test_fsm_transitions() {
        let config = check(json!({"template": {
            "mode": "fsm",
            "templates": [
                {"idle": {
                    "template": "idle.jinja",
                    "initial": true,
                    "transition": {"to": "busy", "when": {"gt": {"shared.load": 0.8}}},
                }},
                {"busy": {
                    "template": "busy.jinja",
                    "transition": {"to": "idle", "when": {"le": {"shared.load": 0.2}}},
                }},
            ],
        }}))
        .unwrap();

        let TemplatePicking::Fsm { templates } = template_config(config).picking else {
            panic!("expected fsm picking");
        };
        assert!(templates[0].spec.initial);
        assert!(!templates[1].spec.initial);
    }

    #[test]
    fn test_fsm_condition_errors_carry_full_path() {
        let errors = check(json!({"template": {
            "mode": "fsm",
            "templates": [{"idle": {
                "template": "idle.jinja",
                "initial": true,
                "transition": {"to": "idle", "when": {"or": [
                    {"defined": "locals.a"},
                    {"eq": {"x": 1}},
                ]}},
            }}],
        }}))
        .unwrap_err();
        assert!(errors.has(
            r#"template.templates[0].idle.transition.when.or[1].eq.x"#,
            ErrorKind::Constraint
        ));
    }

    #[test]
    fn test_fsm_reference_and_initial_checks() {
        let errors = check(json!({"template": {
            "mode": "fsm",
            "templates": [
                {"a": {"template": "a.jinja", "transition": {"to": "z", "when": {"defined": "locals.x"}}}},
                {"b": {"template": "b.jinja"}},
            ],
        }}))
        .unwrap_err();
        assert!(errors.has(
            "template.templates[0].a.transition.to",
            ErrorKind::InvalidReference
        ));
        assert!(errors.has("template.templates", ErrorKind::Constraint));
    }

    #[test]
    fn test_duplicate_aliases() {
        let errors = check(json!({"template": {
            "mode": "any",
            "templates": [
                {"a": {"template": "a.jinja"}},
                {"a": {"template": "other.jinja"}},
            ],
        }}))
        .unwrap_err();
        assert!(errors.has("template.templates[1].a", ErrorKind::Constraint));
    }

    #[test]
    fn test_template_extension() {
        let errors = check(json!({"template": {
            "mode": "all",
            "templates": [{"a": {"template": "a.j2"}}],
        }}))
        .unwrap_err();
        assert!(errors.has("template.templates[0].a.template", ErrorKind::Constraint));
    }

    #[test]
    fn test_unknown_mode_skips_entries() {
        let errors = check(json!({"template": {
            "mode": "random",
            "templates": [{"a": {"template": "a.jinja"}}],
        }}))
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has("template.mode", ErrorKind::UnknownVariant));
    }

    #[test]
    fn test_samples() {
        let config = check(json!({"template": {
            "mode": "all",
            "templates": [{"a": {"template": "a.jinja"}}],
            "samples": {
                "users": {"type": "csv", "source": "users.csv", "header": true},
                "colors": {"type": "items", "source": ["red", "green"]},
                "hosts": {"type": "json", "source": "hosts.json"},
            },
        }}))
        .unwrap();
        let samples = template_config(config).samples;
        assert_eq!(
            samples["users"],
            SampleConfig::Csv {
                source: "users.csv".into(),
                delimiter: ",".into(),
                header: true,
            }
        );
        assert_eq!(samples.len(), 3);
    }

    #[test]
    fn test_sample_shapes_are_disjoint() {
        let errors = check(json!({"template": {
            "mode": "all",
            "templates": [{"a": {"template": "a.jinja"}}],
            "samples": {
                "a": {"type": "items", "source": []},
                "b": {"type": "csv", "source": "b.tsv"},
                "c": {"type": "json", "source": "c.json", "header": true},
                "d": {"type": "xml", "source": "d.xml"},
            },
        }}))
        .unwrap_err();
        assert!(errors.has("template.samples.a.source", ErrorKind::Constraint));
        assert!(errors.has("template.samples.b.source", ErrorKind::Constraint));
        assert!(errors.has("template.samples.c.header", ErrorKind::UnknownField));
        assert!(errors.has("template.samples.d.type", ErrorKind::UnknownVariant));
    }

    #[test]
    fn test_replay_defaults_and_chunk_size() {
        let config = check(json!({"replay": {"path": "logs.txt"}})).unwrap();
        let EventPluginConfig::Replay(replay) = config else {
            panic!("expected replay plugin");
        };
        assert_eq!(replay.chunk_size, crate::types::DEFAULT_CHUNK_SIZE);
        assert_eq!(replay.encoding, "utf_8");
        assert!(!replay.repeat);
        assert!(replay.timestamp_pattern.is_none());

        let errors = check(json!({"replay": {"path": "logs.txt", "chunk_size": -1}})).unwrap_err();
        assert!(errors.has("replay.chunk_size", ErrorKind::Constraint));

        assert!(check(json!({"replay": {"path": "logs.txt", "chunk_size": 0}})).is_ok());
    }

    #[test]
    fn test_replay_timestamp_pattern() {
        assert!(check(json!({"replay": {
            "path": "access.log",
            "timestamp_pattern": r"^\[(?P<timestamp>[^\]]+)\]",
        }}))
        .is_ok());

        let errors = check(json!({"replay": {
            "path": "access.log",
            "timestamp_pattern": r"^\[([^\]]+)\]",
        }}))
        .unwrap_err();
        assert!(errors.has("replay.timestamp_pattern", ErrorKind::Constraint));

        let errors = check(json!({"replay": {"path": "access.log", "timestamp_pattern": "("}}))
            .unwrap_err();
        assert!(errors.has("replay.timestamp_pattern", ErrorKind::Constraint));
    }

    #[test]
    fn test_replay_pattern_with_lookahead() {
        assert!(check(json!({"replay": {
            "path": "a.log",
            "timestamp_pattern": "^(?P<timestamp>\\d+)(?=\\s)",
        }}))
        .is_ok());
    }

    #[test]
    fn test_samples_checked_without_mode() {
        let errors = check(json!({"template": {
            "templates": [{"a": {"template": "a.jinja"}}],
            "samples": {"s": {"type": "items"}},
        }}))
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has("template.mode", ErrorKind::MissingField));
        assert!(errors.has("template.samples.s.source", ErrorKind::MissingField));
    }

    #[test]
    fn test_script_requires_python_file() {
        assert!(check(json!({"script": {"path": "produce.py"}})).is_ok());
        let errors = check(json!({"script": {"path": "produce.sh"}})).unwrap_err();
        assert!(errors.has("script.path", ErrorKind::Constraint));
    }

    #[test]
    fn test_two_plugin_keys_are_ambiguous() {
        let errors = check(json!({
            "template": {"mode": "all", "templates": [{"a": {"template": "a.jinja"}}]},
            "replay": {"path": "logs.txt"},
        }))
        .unwrap_err();
        assert!(errors.has("", ErrorKind::Ambiguous));
    }
}
