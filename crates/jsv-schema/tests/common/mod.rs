//! Shared proptest strategies for schemas and instances.
//!
//! Both are drawn from a small vocabulary so that generated schemas and
//! instances interact often: object keys are `a`/`b`/`c`, strings use
//! the letters `a`..`c`, and numbers are small integers or halves. Halves
//! are never integral, so every implementation agrees on `integer` and on
//! integral `multipleOf`.

#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::{json, Value};

pub fn instance() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-6i64..6).prop_map(|n| json!(n)),
        (-6i64..6).prop_map(|n| json!(n as f64 + 0.5)),
        "[a-c]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..3).prop_map(|m| {
                let map: serde_json::Map<String, Value> = m.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

fn type_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "null", "boolean", "integer", "number", "string", "array", "object",
    ])
}

/// Keyword schemas with no subschemas.
pub fn leaf_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!(true)),
        Just(json!(false)),
        Just(json!({})),
        type_name().prop_map(|t| json!({"type": t})),
        (type_name(), type_name())
            .prop_filter("distinct type names", |(a, b)| a != b)
            .prop_map(|(a, b)| json!({"type": [a, b]})),
        prop::collection::vec(instance(), 0..3).prop_map(|v| json!({"enum": v})),
        instance().prop_map(|v| json!({"const": v})),
        (-5i64..5).prop_map(|n| json!({"minimum": n})),
        (-5i64..5).prop_map(|n| json!({"maximum": n})),
        (-5i64..5).prop_map(|n| json!({"exclusiveMinimum": n})),
        (-5i64..5).prop_map(|n| json!({"exclusiveMaximum": n})),
        (1i64..4).prop_map(|n| json!({"multipleOf": n})),
        (0u64..4).prop_map(|n| json!({"minLength": n})),
        (0u64..4).prop_map(|n| json!({"maxLength": n})),
        (0u64..3).prop_map(|n| json!({"minItems": n})),
        (0u64..3).prop_map(|n| json!({"maxItems": n})),
        prop::sample::subsequence(vec!["a", "b", "c"], 0..=3).prop_map(|names| json!({"required": names})),
    ]
}

/// Schemas over the keyword subset shared with other implementations:
/// no `format`, no `pattern`, uniform `items` only, no `$ref`.
pub fn schema() -> impl Strategy<Value = Value> {
    leaf_schema().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(|v| json!({"allOf": v})),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|v| json!({"anyOf": v})),
            prop::collection::vec(inner.clone(), 1..3).prop_map(|v| json!({"oneOf": v})),
            inner.clone().prop_map(|s| json!({"not": s})),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(i, t, e)| json!({"if": i, "then": t, "else": e})),
            inner.clone().prop_map(|s| json!({"items": s})),
            (inner.clone(), inner).prop_map(|(a, b)| json!({"properties": {"a": a, "b": b}})),
        ]
    })
}
