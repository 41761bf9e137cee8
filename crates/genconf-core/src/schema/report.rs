//! Translate JSON Schema violations into path-qualified field errors
//!
//! `jsonschema` reports an instance location as a JSON pointer and a
//! keyword. The keyword decides the [`ErrorKind`]; the subschema at the
//! same location supplies the wording (`title`, `description`, `enum`,
//! `properties`).

use super::registry::Schema;
use super::{closest, type_name, ErrorKind, FieldError, FieldPath, PathSegment};
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

/// Every violation of `value` against `schema`, rooted at `base`
pub(crate) fn violations(schema: Schema<'_>, value: &Value, base: &FieldPath) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = Vec::new();
    for error in schema.validator().iter_errors(value) {
        for field_error in describe(schema, value, base, &error) {
            // Keywords evaluated per property (required, additionalProperties)
            // can describe the same field twice
            if !out.contains(&field_error) {
                out.push(field_error);
            }
        }
    }
    out
}

/// Split a JSON pointer into path segments, using the instance to tell
/// array indexes from numeric object keys
fn locate<'v>(value: &'v Value, pointer: &str) -> (Vec<PathSegment>, &'v Value) {
    let mut segments = Vec::new();
    let mut current = value;

    for raw in pointer.split('/').skip(1) {
        let token = raw.replace("~1", "/").replace("~0", "~");
        match current {
            Value::Array(items) => {
                let Some((index, item)) = token
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index).map(|item| (index, item)))
                else {
                    break;
                };
                segments.push(PathSegment::Index(index));
                current = item;
            }
            Value::Object(map) => {
                let Some(item) = map.get(&token) else {
                    break;
                };
                current = item;
                segments.push(PathSegment::Key(token));
            }
            _ => break,
        }
    }

    (segments, current)
}

fn join(base: &FieldPath, segments: &[PathSegment]) -> FieldPath {
    segments.iter().fold(base.clone(), |path, segment| match segment {
        PathSegment::Key(key) => path.key(key.as_str()),
        PathSegment::Index(index) => path.index(*index),
    })
}

fn text<'n>(node: Option<&'n Value>, keyword: &str) -> Option<&'n str> {
    node.and_then(|n| n.get(keyword)).and_then(Value::as_str)
}

fn names<'n>(node: Option<&'n Value>, keyword: &str) -> Vec<&'n str> {
    node.and_then(|n| n.get(keyword))
        .map(|value| match value {
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
}

fn number(node: Option<&Value>, keyword: &str) -> Option<String> {
    node.and_then(|n| n.get(keyword))
        .filter(|v| v.is_number())
        .map(Value::to_string)
}

fn article(type_name: &str) -> String {
    match type_name {
        "null" => "null".to_string(),
        "object" | "array" | "integer" => format!("an {}", type_name),
        other => format!("a {}", other),
    }
}

fn expected_types(node: Option<&Value>) -> String {
    match node.and_then(|n| n.get("type")) {
        Some(Value::String(name)) => article(name),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(article)
            .collect::<Vec<_>>()
            .join(" or "),
        _ => "another type".to_string(),
    }
}

fn show(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}

fn bounds(node: Option<&Value>, instance: &Value) -> String {
    let got = show(instance);
    match (
        number(node, "minimum"),
        number(node, "maximum"),
        number(node, "exclusiveMinimum"),
    ) {
        (Some(min), Some(max), _) => format!("must be between {} and {}, got {}", min, max, got),
        (Some(min), None, _) => format!("must be greater than or equal to {}, got {}", min, got),
        (None, Some(max), _) => format!("must be less than or equal to {}, got {}", max, got),
        (None, None, Some(min)) => format!("must be greater than {}, got {}", min, got),
        (None, None, None) => format!("is out of range, got {}", got),
    }
}

/// `required` names of `oneOf` branches that only list required fields
fn exclusive_fields(node: Option<&Value>) -> Option<Vec<&str>> {
    let branches = node?.get("oneOf")?.as_array()?;
    let mut fields = Vec::new();
    for branch in branches {
        let map = branch.as_object()?;
        if map.len() != 1 {
            return None;
        }
        fields.extend(names(Some(branch), "required"));
    }
    Some(fields)
}

fn quoted(items: &[&str], separator: &str) -> String {
    items
        .iter()
        .map(|item| format!("'{}'", item))
        .collect::<Vec<_>>()
        .join(separator)
}

fn describe(
    schema: Schema<'_>,
    value: &Value,
    base: &FieldPath,
    error: &ValidationError<'_>,
) -> Vec<FieldError> {
    let pointer = error.instance_path().to_string();
    let (segments, instance) = locate(value, &pointer);
    let node = schema.node_at(&segments);
    let path = join(base, &segments);
    let at = |kind: ErrorKind, message: String| FieldError {
        path: path.clone(),
        kind,
        message,
    };

    match error.kind() {
        ValidationErrorKind::Type { .. } => vec![at(
            ErrorKind::InvalidType,
            format!(
                "expected {}, found {}",
                expected_types(node),
                type_name(instance)
            ),
        )],

        ValidationErrorKind::Required { .. } => {
            let present = instance.as_object();
            names(node, "required")
                .into_iter()
                .filter(|name| present.is_some_and(|map| !map.contains_key(*name)))
                .map(|name| FieldError {
                    path: path.key(name),
                    kind: ErrorKind::MissingField,
                    message: "missing required field".to_string(),
                })
                .collect()
        }

        ValidationErrorKind::AdditionalProperties { .. } => {
            let known = names(node, "properties");
            let Some(map) = instance.as_object() else {
                return Vec::new();
            };
            map.keys()
                .filter(|key| !known.contains(&key.as_str()))
                .map(|key| {
                    let mut message = if known.is_empty() {
                        format!("unknown field '{}', no fields are allowed here", key)
                    } else {
                        format!(
                            "unknown field '{}', expected one of: {}",
                            key,
                            known.join(", ")
                        )
                    };
                    if let Some(suggestion) = closest(key, &known) {
                        message.push_str(&format!("; did you mean '{}'?", suggestion));
                    }
                    FieldError {
                        path: path.key(key.as_str()),
                        kind: ErrorKind::UnknownField,
                        message,
                    }
                })
                .collect()
        }

        ValidationErrorKind::Enum { .. } => {
            let options = names(node, "enum");
            let what = text(node, "title").unwrap_or("value");
            match instance {
                Value::String(name) => {
                    let mut message = format!(
                        "unknown {} '{}', expected one of: {}",
                        what,
                        name,
                        options.join(", ")
                    );
                    if let Some(suggestion) = closest(name, &options) {
                        message.push_str(&format!("; did you mean '{}'?", suggestion));
                    }
                    vec![at(ErrorKind::UnknownVariant, message)]
                }
                other => vec![at(
                    ErrorKind::InvalidType,
                    format!(
                        "expected a {} ({}), found {}",
                        what,
                        options.join(", "),
                        type_name(other)
                    ),
                )],
            }
        }

        ValidationErrorKind::MinProperties { .. } => vec![at(
            ErrorKind::MissingField,
            format!(
                "expected exactly one {}, found an empty object",
                text(node, "title").unwrap_or("entry")
            ),
        )],

        ValidationErrorKind::MaxProperties { .. } => {
            let keys: Vec<&str> = instance
                .as_object()
                .map(|map| map.keys().map(String::as_str).collect())
                .unwrap_or_default();
            vec![at(
                ErrorKind::Ambiguous,
                format!(
                    "expected exactly one {}, found {} keys: {}",
                    text(node, "title").unwrap_or("entry"),
                    keys.len(),
                    quoted(&keys, ", ")
                ),
            )]
        }

        ValidationErrorKind::PropertyNames { .. } => {
            let names_node = node
                .and_then(|n| n.get("propertyNames"))
                .map(|n| schema.resolve(n));
            let what = text(names_node, "title").unwrap_or("key");
            let expected = text(names_node, "description").unwrap_or("a valid key");
            let keys: Vec<&String> = instance
                .as_object()
                .map(|map| map.keys().collect())
                .unwrap_or_default();

            match keys.as_slice() {
                [key] => vec![FieldError {
                    path: path.key(key.as_str()),
                    kind: ErrorKind::Constraint,
                    message: format!("invalid {} '{}', expected {}", what, key, expected),
                }],
                _ => vec![at(
                    ErrorKind::Constraint,
                    format!("every {} must be {}", what, expected),
                )],
            }
        }

        ValidationErrorKind::MinItems { .. } => {
            let min = number(node, "minItems").unwrap_or_else(|| "1".to_string());
            let len = instance.as_array().map_or(0, Vec::len);
            vec![at(
                ErrorKind::Constraint,
                format!("must contain at least {} item(s), got {}", min, len),
            )]
        }

        ValidationErrorKind::MinLength { .. } => {
            vec![at(ErrorKind::Constraint, "must not be empty".to_string())]
        }

        ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. } => {
            vec![at(ErrorKind::Constraint, bounds(node, instance))]
        }

        ValidationErrorKind::Pattern { .. } => {
            let expected = text(node, "description").unwrap_or("a value matching the pattern");
            let message = match text(node, "title") {
                Some(what) => format!("invalid {} {}, expected {}", what, show(instance), expected),
                None => format!("expected {}, got {}", expected, show(instance)),
            };
            vec![at(ErrorKind::Constraint, message)]
        }

        ValidationErrorKind::OneOfNotValid { .. } => match exclusive_fields(node) {
            Some(fields) => vec![at(
                ErrorKind::MissingField,
                format!("one of {} is required", quoted(&fields, " or ")),
            )],
            None => vec![at(ErrorKind::Constraint, error.to_string())],
        },

        ValidationErrorKind::OneOfMultipleValid { .. } => match exclusive_fields(node) {
            Some(fields) => vec![at(
                ErrorKind::Constraint,
                format!("only one of {} may be set", quoted(&fields, " or ")),
            )],
            None => vec![at(ErrorKind::Constraint, error.to_string())],
        },

        _ => vec![at(ErrorKind::Constraint, error.to_string())],
    }
}
