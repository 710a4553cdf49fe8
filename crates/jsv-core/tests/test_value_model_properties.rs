//! Property tests for the value model primitives shared by the engine.
//!
//! Pointers built with `push_key`/`push_index` must round-trip through
//! `tokens()` and `evaluate()` for arbitrary keys, including the two
//! characters RFC 6901 escapes, and structural equality must behave as an
//! equivalence over arbitrary JSON trees.

use jsv_core::{json_equal, JsonPointer};
use proptest::prelude::*;
use serde_json::{json, Value};

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[a-z~/ ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z~/]{1,6}", inner, 0..6).prop_map(|m| {
                let map: serde_json::Map<String, Value> = m.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn test_pointer_tokens_round_trip(keys in prop::collection::vec("[a-z~/0-9]{0,8}", 0..6)) {
        let mut pointer = JsonPointer::root();
        for k in &keys {
            pointer = pointer.push_key(k);
        }
        let tokens: Vec<String> = pointer.tokens().collect();
        prop_assert_eq!(&tokens, &keys);
        prop_assert!(JsonPointer::parse(pointer.as_str()).is_ok());
    }

    #[test]
    fn test_pointer_evaluates_nested_objects(keys in prop::collection::vec("[a-z~/]{1,6}", 1..5)) {
        let mut doc = json!("leaf");
        for k in keys.iter().rev() {
            let mut map = serde_json::Map::new();
            map.insert(k.clone(), doc);
            doc = Value::Object(map);
        }
        let mut pointer = JsonPointer::root();
        for k in &keys {
            pointer = pointer.push_key(k);
        }
        prop_assert_eq!(pointer.evaluate(&doc), Some(&json!("leaf")));
    }

    #[test]
    fn test_json_equal_is_reflexive(value in json_value()) {
        prop_assert!(json_equal(&value, &value));
    }

    #[test]
    fn test_json_equal_is_symmetric(a in json_value(), b in json_value()) {
        prop_assert_eq!(json_equal(&a, &b), json_equal(&b, &a));
    }

    #[test]
    fn test_integers_equal_their_float_form(n in -1_000_000i64..1_000_000) {
        prop_assert!(json_equal(&json!(n), &json!(n as f64)));
    }
}
