//! Generator document validation
//!
//! The top-level sections are checked against `generator/generator`;
//! every plugin entry is then validated by its own category.

use super::event::event_plugin;
use super::input::input_plugin;
use super::output::output_plugin;
use crate::schema::{Checker, FieldPath, SchemaFamily};
use crate::types::GeneratorConfig;
use serde_json::Value;

pub(crate) fn generator(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<GeneratorConfig> {
    let conforms = ck.conform(SchemaFamily::Generator, "generator", value, path);
    // Entries are checked even when a section is missing, so one pass
    // reports everything
    let input = value
        .get("input")
        .and_then(Value::as_array)
        .map(|items| entries(ck, items, &path.key("input"), input_plugin));
    let event = value
        .get("event")
        .map(|event| event_plugin(ck, event, &path.key("event")));
    let output = value
        .get("output")
        .and_then(Value::as_array)
        .map(|items| entries(ck, items, &path.key("output"), output_plugin));

    if !conforms {
        return None;
    }
    Some(GeneratorConfig {
        input: input??,
        event: event??,
        output: output??,
    })
}

fn entries<T>(
    ck: &mut Checker,
    items: &[Value],
    path: &FieldPath,
    entry: fn(&mut Checker, &Value, &FieldPath) -> Option<T>,
) -> Option<Vec<T>> {
    let mut out = Vec::with_capacity(items.len());
    let mut valid = true;

    for (index, item) in items.iter().enumerate() {
        match entry(ck, item, &path.index(index)) {
            Some(config) => out.push(config),
            None => valid = false,
        }
    }

    valid.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ErrorKind, ValidationErrors, ValidationOptions};
    use serde_json::json;

    fn check(value: Value) -> Result<GeneratorConfig, ValidationErrors> {
        let mut ck = Checker::new(ValidationOptions::default());
        let out = generator(&mut ck, &value, &FieldPath::root());
        ck.finish(out)
    }

    #[test]
    fn test_minimal_generator() {
        let config = check(json!({
            "input": [{"static": {"count": 1}}],
            "event": {"script": {"path": "produce.py"}},
            "output": [{"stdout": {}}],
        }))
        .unwrap();
        assert_eq!(config.input.len(), 1);
        assert_eq!(config.event.name(), "script");
        assert_eq!(config.output[0].name(), "stdout");
    }

    #[test]
    fn test_nested_errors_are_path_qualified() {
        let errors = check(json!({
            "input": [{"static": {"count": 1}}, {"cron": {"expression": "* * * * *", "count": 0}}],
            "event": {"script": {"path": "produce.sh"}},
            "output": [],
        }))
        .unwrap_err();
        assert!(errors.has("input[1].cron.count", ErrorKind::Constraint));
        assert!(errors.has("event.script.path", ErrorKind::Constraint));
        assert!(errors.has("output", ErrorKind::Constraint));
    }

    #[test]
    fn test_unknown_section() {
        let errors = check(json!({
            "input": [{"static": {"count": 1}}],
            "event": {"script": {"path": "produce.py"}},
            "output": [{"stdout": {}}],
            "outputs": [],
        }))
        .unwrap_err();
        assert!(errors.has("outputs", ErrorKind::UnknownField));
        assert!(errors.to_string().contains("did you mean 'output'?"));
    }

    #[test]
    fn test_missing_sections() {
        let errors = check(json!({"input": [{"static": {"count": 1}}]})).unwrap_err();
        assert!(errors.has("event", ErrorKind::MissingField));
        assert!(errors.has("output", ErrorKind::MissingField));
    }
}
