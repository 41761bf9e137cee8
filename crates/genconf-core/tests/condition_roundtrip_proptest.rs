//! Property-based tests for the condition grammar
//!
//! Valid condition trees of bounded depth must validate, serialize back to
//! the document they came from, and validate again to an equal value.

use genconf_core::types::Condition;
use genconf_core::{validate_condition, ErrorKind};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn state_field_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["locals", "shared", "globals"]),
        "[a-z][a-z0-9_]{0,8}(\\.[a-z]{1,4})?",
    )
        .prop_map(|(scope, rest)| format!("{}.{}", scope, rest))
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z ]{0,10}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn number_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
    ]
}

fn timestamp_strategy() -> impl Strategy<Value = Value> {
    (
        prop::option::of(1u16..=9999),
        prop::option::of(1u8..=12),
        prop::option::of(1u8..=31),
        prop::option::of(0u8..=23),
        prop::option::of(0u8..=59),
        prop::option::of(0u8..=59),
        prop::option::of(0u32..=999_999),
    )
        .prop_map(|(year, month, day, hour, minute, second, microsecond)| {
            let mut ts = Map::new();
            let components = [
                ("year", year.map(Value::from)),
                ("month", month.map(Value::from)),
                ("day", day.map(Value::from)),
                ("hour", hour.map(Value::from)),
                ("minute", minute.map(Value::from)),
                ("second", second.map(Value::from)),
                ("microsecond", microsecond.map(Value::from)),
            ];
            for (name, value) in components {
                if let Some(value) = value {
                    ts.insert(name.to_string(), value);
                }
            }
            Value::Object(ts)
        })
}

fn field_check(
    key: &'static str,
    operand: impl Strategy<Value = Value>,
) -> impl Strategy<Value = Value> {
    (state_field_strategy(), operand).prop_map(move |(field, value)| json!({ key: { field: value } }))
}

fn leaf_strategy() -> impl Strategy<Value = Value> {
    let patterns = prop::sample::select(vec!["^idle$", "err(or)?", r"\d+", "[a-z]+_[0-9]{2}"]);
    let tag = "[a-z]{1,6}";

    let field_checks = prop_oneof![
        field_check("eq", scalar_strategy()),
        field_check("contains", scalar_strategy()),
        field_check("gt", number_strategy()),
        field_check("ge", number_strategy()),
        field_check("lt", number_strategy()),
        field_check("le", number_strategy()),
        field_check("matches", patterns.prop_map(Value::from)),
        field_check("len_eq", (0u64..100).prop_map(Value::from)),
        field_check("len_le", (0u64..100).prop_map(Value::from)),
        field_check("in", prop::collection::vec(scalar_strategy(), 0..4).prop_map(Value::Array)),
    ];
    let others = prop_oneof![
        state_field_strategy().prop_map(|field| json!({ "defined": field })),
        tag.prop_map(|tag| json!({ "has_tags": tag })),
        prop::collection::vec(tag, 1..4).prop_map(|tags| json!({ "has_tags": tags })),
        timestamp_strategy().prop_map(|ts| json!({ "before": ts })),
        timestamp_strategy().prop_map(|ts| json!({ "after": ts })),
    ];

    prop_oneof![field_checks, others]
}

/// Condition trees at most 5 levels deep
fn condition_strategy() -> impl Strategy<Value = Value> {
    leaf_strategy().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(|c| json!({ "and": c })),
            prop::collection::vec(inner.clone(), 2..4).prop_map(|c| json!({ "or": c })),
            inner.prop_map(|c| json!({ "not": c })),
        ]
    })
}

proptest! {
    #[test]
    fn test_valid_conditions_round_trip(input in condition_strategy()) {
        let condition = validate_condition(&input);
        prop_assert!(condition.is_ok(), "rejected {}: {:?}", input, condition.as_ref().err());
        let condition = condition.unwrap();
        prop_assert!(condition.depth() <= 5);

        let wire = serde_json::to_value(&condition).unwrap();
        prop_assert_eq!(&wire, &input);

        let again: Condition = serde_json::from_value(wire).unwrap();
        prop_assert_eq!(again, condition);
    }

    #[test]
    fn test_extra_top_level_key_is_ambiguous(
        input in condition_strategy(),
        extra in leaf_strategy(),
    ) {
        let mut merged = input.as_object().cloned().unwrap_or_default();
        let extra = extra.as_object().cloned().unwrap_or_default();
        let (extra_key, extra_value) = extra.into_iter().next().unwrap();
        prop_assume!(!merged.contains_key(&extra_key));
        merged.insert(extra_key, extra_value);

        let errors = validate_condition(&Value::Object(merged)).unwrap_err();
        prop_assert_eq!(errors.len(), 1);
        prop_assert!(errors.has("", ErrorKind::Ambiguous));
    }

    #[test]
    fn test_unscoped_field_is_rejected(name in "[a-z]{1,8}") {
        let errors = validate_condition(&json!({ "defined": name })).unwrap_err();
        prop_assert!(errors.has("defined", ErrorKind::Constraint));
    }
}
