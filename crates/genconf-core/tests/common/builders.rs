//! Builders for test documents

use serde_json::{json, Value};

/// `n` nested `not` conditions around a `defined` leaf
pub fn not_chain(n: usize) -> Value {
    let mut condition = json!({"defined": "locals.x"});
    for _ in 0..n {
        condition = json!({ "not": condition });
    }
    condition
}

/// Template event plugin with the given mode and template entries
pub fn template_plugin(mode: &str, templates: Value) -> Value {
    json!({"template": {"mode": mode, "templates": templates}})
}

/// Add `extra` fields to the body of a one-key named config
pub fn with_fields(mut config: Value, extra: Value) -> Value {
    if let (Some(plugin), Value::Object(extra)) = (config.as_object_mut(), extra) {
        if let Some(Value::Object(body)) = plugin.values_mut().next() {
            body.extend(extra);
        }
    }
    config
}

/// Smallest valid generator document
pub fn minimal_generator() -> Value {
    json!({
        "input": [{"static": {"count": 1}}],
        "event": {"script": {"path": "produce.py"}},
        "output": [{"stdout": {}}],
    })
}

pub const GENERATOR_YAML: &str = r#"
input:
  - cron:
      expression: "*/5 * * * *"
      count: 10
      tags: [scheduled]
event:
  template:
    mode: fsm
    params:
      host: web-01
    templates:
      - idle:
          template: idle.jinja
          initial: true
          transition:
            to: busy
            when:
              gt: { shared.load: 0.8 }
      - busy:
          template: busy.jinja
          transition:
            to: idle
            when:
              not:
                gt: { shared.load: 0.8 }
output:
  - stdout: {}
  - file:
      path: events.log
      formatter:
        format: json
        indent: 2
"#;
