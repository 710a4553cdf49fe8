//! # YAML Ingestion
//!
//! Configuration documents are often authored in YAML. The engine only
//! understands the JSON value model, so YAML trees are converted before
//! validation. Only the JSON-compatible subset is accepted: tags are
//! dropped, scalar keys are stringified, and anything JSON cannot
//! represent is rejected.

use serde_json::Value;

use crate::error::JsvError;

/// Parse YAML text and convert it into a JSON value.
///
/// # Errors
///
/// Returns [`JsvError::Yaml`] if the text is not valid YAML or uses
/// constructs with no JSON equivalent.
pub fn yaml_str_to_json_value(text: &str) -> Result<Value, JsvError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| JsvError::Yaml(format!("invalid YAML: {e}")))?;
    yaml_to_json_value(&yaml)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`JsvError::Yaml`] for non-finite floats and for mapping keys
/// that are sequences, mappings or null.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, JsvError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| JsvError::Yaml(format!("cannot represent float {f} in JSON")))
            } else {
                Err(JsvError::Yaml(format!("unsupported YAML number: {n:?}")))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(JsvError::Yaml(format!(
                            "unsupported YAML map key type: {other:?}"
                        )))
                    }
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_to_json_conversion() {
        let json_value = yaml_str_to_json_value(
            r#"
service: billing
version: "1.0.0"
replicas: 3
ratio: 0.5
enabled: true
ports:
  - 80
  - 443
"#,
        )
        .unwrap();

        assert_eq!(json_value["service"], "billing");
        assert_eq!(json_value["version"], "1.0.0");
        assert_eq!(json_value["replicas"], 3);
        assert_eq!(json_value["ratio"], 0.5);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["ports"][1], 443);
    }

    #[test]
    fn test_yaml_key_order_is_preserved() {
        let json_value = yaml_str_to_json_value("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<&String> = json_value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_yaml_scalar_keys_are_stringified() {
        let json_value = yaml_str_to_json_value("1: one\ntrue: yes\n").unwrap();
        assert_eq!(json_value["1"], "one");
        assert_eq!(json_value["true"], "yes");
    }

    #[test]
    fn test_yaml_non_finite_float_rejected() {
        let err = yaml_str_to_json_value("value: .inf\n").unwrap_err();
        assert!(matches!(err, JsvError::Yaml(_)));
    }

    #[test]
    fn test_yaml_sequence_key_rejected() {
        let err = yaml_str_to_json_value("? [a, b]\n: value\n").unwrap_err();
        assert!(err.to_string().contains("map key"));
    }

    #[test]
    fn test_invalid_yaml_text() {
        let err = yaml_str_to_json_value("a: [unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }
}
