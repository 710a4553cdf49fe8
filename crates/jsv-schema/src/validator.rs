//! # Compiled Validator
//!
//! A [`Validator`] is immutable once built. It is `Send + Sync` and is
//! meant to be compiled once (for example at service startup) and shared
//! behind an `Arc` across any number of concurrent validations.
//!
//! Two query forms are offered:
//!
//! - [`Validator::is_valid`]: boolean, no allocation on the happy path.
//! - [`Validator::validate`] / [`Validator::error_report`]: on failure,
//!   explain the failure once into an [`ErrorReport`].
//!
//! The report is empty if and only if `is_valid` returns true.

use std::sync::Arc;

use jsv_core::CompileError;
use serde_json::Value;
use url::Url;

use crate::messages::MessageFormatter;
use crate::node::{SchemaNode, Validate};
use crate::options::ValidationOptions;
use crate::output::{BasicOutput, DetailedOutput, ErrorReport};
use crate::paths::InstancePath;
use crate::registry::Registry;

const ROOT: usize = 0;

/// A compiled schema.
#[derive(Debug)]
pub struct Validator {
    nodes: Vec<SchemaNode>,
    registry: Arc<Registry>,
    document: Arc<Url>,
}

impl Validator {
    /// Compile `schema` with default options.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] for dangling references or malformed
    /// keywords.
    pub fn new(schema: &Value) -> Result<Self, CompileError> {
        ValidationOptions::default().build(schema)
    }

    pub(crate) fn from_parts(nodes: Vec<SchemaNode>, registry: Arc<Registry>, document: Arc<Url>) -> Self {
        Self {
            nodes,
            registry,
            document,
        }
    }

    /// Returns true if `instance` conforms.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.nodes[ROOT].is_valid(&self.nodes, instance)
    }

    /// `Ok(())` if `instance` conforms, the error report otherwise.
    pub fn validate(&self, instance: &Value) -> Result<(), ErrorReport> {
        if self.is_valid(instance) {
            return Ok(());
        }
        let tree = self.nodes[ROOT].explain(&self.nodes, instance, &InstancePath::root());
        Err(ErrorReport::from_tree(tree))
    }

    /// The error report for `instance`; empty if it conforms.
    pub fn error_report(&self, instance: &Value) -> ErrorReport {
        self.validate(instance).err().unwrap_or_default()
    }

    /// Flat output with messages rendered by `messages`.
    pub fn basic_output(&self, instance: &Value, messages: &dyn MessageFormatter) -> BasicOutput {
        self.error_report(instance).basic_output(messages)
    }

    /// Nested output with messages rendered by `messages`.
    pub fn detailed_output(&self, instance: &Value, messages: &dyn MessageFormatter) -> DetailedOutput {
        self.error_report(instance).detailed_output(messages)
    }

    /// The document cache this validator was compiled from.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// URI of the root schema document.
    pub fn document_uri(&self) -> &Url {
        &self.document
    }

    /// Number of compiled slots (the root plus one per `$ref` target).
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultMessages;
    use serde_json::json;

    fn validator(schema: Value) -> Validator {
        Validator::new(&schema).unwrap()
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_default_document_uri() {
        let v = validator(json!({}));
        assert_eq!(v.document_uri().as_str(), "json-schema:///");
        let v = validator(json!({"$id": "https://example.com/person.json"}));
        assert_eq!(v.document_uri().as_str(), "https://example.com/person.json");
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(validator(json!(true)).is_valid(&json!({"anything": 1})));
        let never = validator(json!(false));
        let report = never.error_report(&json!(1));
        assert_eq!(report.len(), 1);
        assert_eq!(report.entries()[0].kind.code(), "falseSchema");
    }

    #[test]
    fn test_validate_returns_report_on_failure() {
        let v = validator(json!({"type": "object", "required": ["name", "age"]}));
        assert!(v.validate(&json!({"name": "x", "age": 3})).is_ok());
        let report = v.validate(&json!({})).unwrap_err();
        assert_eq!(report.len(), 2);
        assert!(report
            .entries()
            .iter()
            .all(|e| e.schema_location.as_str() == "/required"));
    }

    #[test]
    fn test_properties_blame_first_failing_child() {
        let v = validator(json!({
            "properties": {
                "a": {"type": "string"},
                "b": {"minimum": 10}
            }
        }));
        let report = v.error_report(&json!({"a": 1, "b": 5}));
        let first = report.first().unwrap();
        assert_eq!(first.instance_location.as_str(), "/a");
        assert_eq!(first.schema_location.as_str(), "/properties/a/type");
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_any_of_reports_last_branch() {
        let v = validator(json!({"anyOf": [{"type": "string"}, {"minimum": 10}]}));
        let report = v.error_report(&json!(5));
        let codes: Vec<&str> = report.entries().iter().map(|e| e.kind.code()).collect();
        assert_eq!(codes, vec!["anyOf", "minimum"]);
        assert_eq!(report.entries()[1].schema_location.as_str(), "/anyOf/1/minimum");
    }

    #[test]
    fn test_one_of_multiple_matches_lists_branches() {
        let v = validator(json!({"oneOf": [{"const": 5}, {"type": "number"}]}));
        let report = v.error_report(&json!(5));
        assert_eq!(report.len(), 1);
        match &report.entries()[0].kind {
            crate::ValidationErrorKind::OneOfMultipleValid { matched } => assert_eq!(matched, &vec![0, 1]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_if_then_else_picks_branch() {
        let v = validator(json!({
            "if": {"type": "integer"},
            "then": {"minimum": 0},
            "else": {"type": "string"}
        }));
        assert!(v.is_valid(&json!(3)));
        assert!(v.is_valid(&json!("x")));
        let report = v.error_report(&json!(-1));
        assert_eq!(report.first().unwrap().schema_location.as_str(), "/then/minimum");
        let report = v.error_report(&json!(null));
        assert_eq!(report.first().unwrap().schema_location.as_str(), "/else/type");
    }

    #[test]
    fn test_items_locations() {
        let v = validator(json!({"items": {"type": "integer"}}));
        let report = v.error_report(&json!([1, "two", 3, 4.5]));
        let locations: Vec<&str> = report.entries().iter().map(|e| e.instance_location.as_str()).collect();
        assert_eq!(locations, vec!["/1", "/3"]);

        let tuple = validator(json!({"items": [{"type": "string"}, {"type": "number"}]}));
        assert!(tuple.is_valid(&json!(["a", 1, {"extra": true}])));
        assert!(!tuple.is_valid(&json!([1, "a"])));
    }

    #[test]
    fn test_recursive_schema_validates_nested_instances() {
        let v = validator(json!({
            "type": "object",
            "properties": {
                "value": {"type": "integer"},
                "next": {"$ref": "#"}
            }
        }));
        assert!(v.is_valid(&json!({"value": 1, "next": {"value": 2, "next": {"value": 3}}})));
        let report = v.error_report(&json!({"value": 1, "next": {"value": "two"}}));
        assert_eq!(report.first().unwrap().instance_location.as_str(), "/next/value");
        assert_eq!(v.slot_count(), 1);
    }

    #[test]
    fn test_basic_output_valid_instance() {
        let v = validator(json!({"type": "string"}));
        let output = serde_json::to_value(v.basic_output(&json!("ok"), &DefaultMessages)).unwrap();
        assert_eq!(output, json!({"valid": true}));
    }

    #[test]
    fn test_registry_is_shared_with_caller() {
        let v = validator(json!({"$defs": {"a": true}, "$ref": "#/$defs/a"}));
        assert_eq!(v.registry().document_count(), 1);
        assert_eq!(v.slot_count(), 2);
    }
}
