//! Condition grammar validation
//!
//! The condition key is dispatched here; each payload is checked against
//! its definition in `schemas/condition.schema.json`. `and`, `or` and
//! `not` recurse under the depth limit.

use crate::schema::{Checker, ErrorKind, FieldPath, Keyword, SchemaFamily};
use crate::types::{Condition, ConditionKind};
use serde_json::Value;
use tracing::trace;

/// Validate one condition object, recursing into `and`/`or`/`not`
pub(crate) fn condition(ck: &mut Checker, value: &Value, path: &FieldPath) -> Option<Condition> {
    ck.nested(path, |ck| {
        let (key, payload) = ck.single_entry(value, path, "condition", ConditionKind::NAMES)?;
        let Some(kind) = ConditionKind::from_name(key) else {
            ck.unknown_variant(path, "condition", key, ConditionKind::NAMES);
            return None;
        };

        trace!(%path, kind = kind.name(), "validating condition");
        let inner = path.key(key);
        let family = SchemaFamily::Condition;

        match kind {
            ConditionKind::Eq => ck.parse(family, key, payload, &inner).map(Condition::Eq),
            ConditionKind::Contains => {
                ck.parse(family, key, payload, &inner).map(Condition::Contains)
            }
            ConditionKind::Gt => ck.parse(family, key, payload, &inner).map(Condition::Gt),
            ConditionKind::Ge => ck.parse(family, key, payload, &inner).map(Condition::Ge),
            ConditionKind::Lt => ck.parse(family, key, payload, &inner).map(Condition::Lt),
            ConditionKind::Le => ck.parse(family, key, payload, &inner).map(Condition::Le),
            ConditionKind::Matches => {
                let patterns_ok = patterns(ck, payload, &inner);
                let conforms = ck.conform(family, key, payload, &inner);
                if !(patterns_ok && conforms) {
                    return None;
                }
                ck.typed(payload, &inner).map(Condition::Matches)
            }
            ConditionKind::LenEq => ck.parse(family, key, payload, &inner).map(Condition::LenEq),
            ConditionKind::LenGt => ck.parse(family, key, payload, &inner).map(Condition::LenGt),
            ConditionKind::LenGe => ck.parse(family, key, payload, &inner).map(Condition::LenGe),
            ConditionKind::LenLt => ck.parse(family, key, payload, &inner).map(Condition::LenLt),
            ConditionKind::LenLe => ck.parse(family, key, payload, &inner).map(Condition::LenLe),
            ConditionKind::In => ck.parse(family, key, payload, &inner).map(Condition::In),
            ConditionKind::Defined => {
                ck.parse(family, key, payload, &inner).map(Condition::Defined)
            }
            ConditionKind::HasTags => ck.parse(family, key, payload, &inner).map(Condition::HasTags),
            ConditionKind::Before => ck.parse(family, key, payload, &inner).map(Condition::Before),
            ConditionKind::After => ck.parse(family, key, payload, &inner).map(Condition::After),
            ConditionKind::And => children(ck, key, payload, &inner).map(Condition::And),
            ConditionKind::Or => children(ck, key, payload, &inner).map(Condition::Or),
            ConditionKind::Not => {
                if !ck.conform(family, key, payload, &inner) {
                    return None;
                }
                condition(ck, payload, &inner).map(|c| Condition::Not(Box::new(c)))
            }
        }
    })
}

/// Operands of `and`/`or`; every child is checked even when the list is too short
fn children(
    ck: &mut Checker,
    key: &str,
    payload: &Value,
    path: &FieldPath,
) -> Option<Vec<Condition>> {
    let conforms = ck.conform(SchemaFamily::Condition, key, payload, path);
    let Value::Array(items) = payload else {
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    let mut valid = conforms;
    for (index, item) in items.iter().enumerate() {
        match condition(ck, item, &path.index(index)) {
            Some(child) => out.push(child),
            None => valid = false,
        }
    }

    valid.then_some(out)
}

/// Compile every string operand of a `matches` payload
fn patterns(ck: &mut Checker, payload: &Value, path: &FieldPath) -> bool {
    let Value::Object(map) = payload else {
        return true;
    };

    let mut valid = true;
    for (field, operand) in map {
        let Value::String(pattern) = operand else {
            continue;
        };
        if let Err(e) = fancy_regex::Regex::new(pattern) {
            ck.report(
                &path.key(field.as_str()),
                ErrorKind::Constraint,
                format!("invalid regular expression: {}", regex_error_summary(&e.to_string())),
            );
            valid = false;
        }
    }
    valid
}

/// Regex errors span several lines; the last one names the problem
pub(crate) fn regex_error_summary(message: &str) -> &str {
    message
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(message)
        .trim()
}
