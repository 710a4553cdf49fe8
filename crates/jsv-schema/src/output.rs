//! # Error Reporting
//!
//! A failed validation is explained once, top-down, into a tree of
//! [`ErrorNode`]s that mirrors the combinator structure of the compiled
//! schema. Both report shapes are derived from that one tree:
//!
//! - **Basic:** the depth-first, declaration-order flattening of every
//!   node that carries a failure ([`ErrorReport::entries`]).
//! - **Detailed:** the tree itself ([`ErrorReport::detailed`]).
//!
//! ## Invariant
//!
//! A report is empty if and only if the instance is valid. Every failing
//! node contributes at least one entry, either its own failure or one
//! from a failing child.

use std::fmt;

use jsv_core::JsonPointer;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationErrorKind;
use crate::messages::MessageFormatter;
use crate::paths::{InstancePath, SchemaLocation};

/// A located, structured validation failure (one basic-output entry).
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    /// Evaluation path of the failing keyword from the root schema. Every
    /// `$ref` followed on the way appears as a `$ref` token.
    pub schema_location: JsonPointer,
    /// `document#pointer` of the failing keyword.
    pub absolute_schema_location: String,
    /// Pointer to the failing value in the instance.
    pub instance_location: JsonPointer,
    /// The failing value.
    pub instance: Value,
    /// What failed.
    pub kind: ValidationErrorKind,
}

impl ErrorEntry {
    /// Render the message with `messages`.
    pub fn message(&self, messages: &dyn MessageFormatter) -> String {
        messages.format(&self.kind, &self.instance)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message(&crate::messages::DefaultMessages);
        if self.instance_location.is_root() {
            write!(f, "  (root): {message}")
        } else {
            write!(f, "  {}: {message}", self.instance_location)
        }
    }
}

/// The failing check at a node of the detailed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// What failed.
    pub kind: ValidationErrorKind,
    /// The failing value.
    pub instance: Value,
}

/// A node of the detailed error tree.
///
/// Container nodes (a subschema's keyword set, `allOf`, `properties`,
/// `items`, `$ref`, `if`/`then`/`else`) have no failure of their own and
/// nest the errors of their failing children. `anyOf`/`oneOf` nodes carry
/// their own failure and nest the last branch's errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorNode {
    /// Where the node was compiled from (the `$ref` target, if any).
    pub location: SchemaLocation,
    /// Evaluation path from the root schema, through `$ref`s.
    pub keyword_location: JsonPointer,
    /// Pointer to the value being validated.
    pub instance_location: JsonPointer,
    /// This node's own failure, if it is not a pure container.
    pub failure: Option<Failure>,
    /// Errors of failing children, in declaration order.
    pub children: Vec<ErrorNode>,
}

impl ErrorNode {
    pub(crate) fn leaf(
        location: &SchemaLocation,
        path: &InstancePath<'_>,
        instance: &Value,
        kind: ValidationErrorKind,
    ) -> Self {
        Self {
            location: location.clone(),
            keyword_location: location.pointer().clone(),
            instance_location: path.to_pointer(),
            failure: Some(Failure {
                kind,
                instance: instance.clone(),
            }),
            children: Vec::new(),
        }
    }

    pub(crate) fn group(
        location: &SchemaLocation,
        path: &InstancePath<'_>,
        children: Vec<ErrorNode>,
    ) -> Self {
        Self {
            location: location.clone(),
            keyword_location: location.pointer().clone(),
            instance_location: path.to_pointer(),
            failure: None,
            children,
        }
    }

    pub(crate) fn with_children(mut self, children: Vec<ErrorNode>) -> Self {
        self.children = children;
        self
    }

    /// Re-root the keyword locations of this subtree: the `from` prefix
    /// (a `$ref` target's pointer) becomes `to` (the path to the `$ref`).
    pub(crate) fn rebase(&mut self, from: &JsonPointer, to: &JsonPointer) {
        if let Some(rest) = self.keyword_location.strip_prefix(from) {
            self.keyword_location = to.join(&rest);
        }
        for child in &mut self.children {
            child.rebase(from, to);
        }
    }

    fn flatten_into(&self, out: &mut Vec<ErrorEntry>) {
        if let Some(failure) = &self.failure {
            out.push(ErrorEntry {
                schema_location: self.keyword_location.clone(),
                absolute_schema_location: self.location.absolute(),
                instance_location: self.instance_location.clone(),
                instance: failure.instance.clone(),
                kind: failure.kind.clone(),
            });
        }
        for child in &self.children {
            child.flatten_into(out);
        }
    }

    fn to_unit(&self, messages: &dyn MessageFormatter) -> DetailedUnit {
        DetailedUnit {
            keyword_location: self.keyword_location.clone(),
            absolute_keyword_location: self.location.absolute(),
            instance_location: self.instance_location.clone(),
            error: self
                .failure
                .as_ref()
                .map(|f| messages.format(&f.kind, &f.instance)),
            kind: self.failure.as_ref().map(|f| f.kind.clone()),
            errors: self.children.iter().map(|c| c.to_unit(messages)).collect(),
        }
    }
}

/// The result of explaining a failed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReport {
    tree: Option<ErrorNode>,
    entries: Vec<ErrorEntry>,
}

impl ErrorReport {
    pub(crate) fn from_tree(tree: ErrorNode) -> Self {
        let mut entries = Vec::new();
        tree.flatten_into(&mut entries);
        Self {
            tree: Some(tree),
            entries,
        }
    }

    /// Returns true if there are no errors (the instance is valid).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of basic entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Basic entries in depth-first, declaration order.
    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    /// The first entry: the blamed failure for the whole instance.
    pub fn first(&self) -> Option<&ErrorEntry> {
        self.entries.first()
    }

    /// Root of the detailed tree, if the instance failed.
    pub fn detailed(&self) -> Option<&ErrorNode> {
        self.tree.as_ref()
    }

    /// Consumes self and returns the basic entries.
    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }

    /// Basic (flat list) output.
    pub fn basic_output(&self, messages: &dyn MessageFormatter) -> BasicOutput {
        BasicOutput {
            valid: self.is_empty(),
            errors: self
                .entries
                .iter()
                .map(|e| OutputUnit {
                    keyword_location: e.schema_location.clone(),
                    absolute_keyword_location: e.absolute_schema_location.clone(),
                    instance_location: e.instance_location.clone(),
                    error: e.message(messages),
                    kind: e.kind.clone(),
                })
                .collect(),
        }
    }

    /// Detailed (nested) output.
    pub fn detailed_output(&self, messages: &dyn MessageFormatter) -> DetailedOutput {
        DetailedOutput {
            valid: self.is_empty(),
            errors: self.tree.iter().map(|t| t.to_unit(messages)).collect(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorReport {}

/// Flat output: `{"valid": ..., "errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicOutput {
    /// True iff there are no errors.
    pub valid: bool,
    /// One unit per failed check.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<OutputUnit>,
}

/// One basic-output entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUnit {
    /// Pointer of the failing keyword.
    pub keyword_location: JsonPointer,
    /// `document#pointer` of the failing keyword.
    pub absolute_keyword_location: String,
    /// Pointer to the failing value.
    pub instance_location: JsonPointer,
    /// Rendered message.
    pub error: String,
    /// Structured kind and parameters.
    #[serde(flatten)]
    pub kind: ValidationErrorKind,
}

/// Nested output: `{"valid": ..., "errors": [<tree>]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedOutput {
    /// True iff there are no errors.
    pub valid: bool,
    /// The root of the error tree, when invalid.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DetailedUnit>,
}

/// A node of the detailed output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedUnit {
    /// Pointer of the keyword.
    pub keyword_location: JsonPointer,
    /// `document#pointer` of the keyword.
    pub absolute_keyword_location: String,
    /// Pointer to the value being validated.
    pub instance_location: JsonPointer,
    /// Rendered message of this node's own failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured kind of this node's own failure.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValidationErrorKind>,
    /// Nested failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DetailedUnit>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::DefaultMessages;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn loc(pointer: &str) -> SchemaLocation {
        SchemaLocation::new(
            Arc::new(Url::parse("https://example.com/s.json").unwrap()),
            JsonPointer::parse(pointer).unwrap(),
        )
    }

    fn sample_tree() -> ErrorNode {
        let root = InstancePath::root();
        let name = root.push_key("name");
        let age = root.push_key("age");
        ErrorNode::group(
            &loc(""),
            &root,
            vec![ErrorNode::group(
                &loc("/properties"),
                &root,
                vec![
                    ErrorNode::leaf(
                        &loc("/properties/name/type"),
                        &name,
                        &json!(5),
                        ValidationErrorKind::Type {
                            expected: vec![jsv_core::PrimitiveType::String],
                            actual: jsv_core::PrimitiveType::Integer,
                        },
                    ),
                    ErrorNode::leaf(
                        &loc("/properties/age/minimum"),
                        &age,
                        &json!(-1),
                        ValidationErrorKind::Minimum { limit: serde_json::Number::from(0) },
                    ),
                ],
            )],
        )
    }

    #[test]
    fn test_entries_are_depth_first() {
        let report = ErrorReport::from_tree(sample_tree());
        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0].instance_location.as_str(), "/name");
        assert_eq!(report.entries()[1].schema_location.as_str(), "/properties/age/minimum");
        assert_eq!(report.first().map(|e| e.kind.code()), Some("type"));
    }

    #[test]
    fn test_default_report_is_empty() {
        let report = ErrorReport::default();
        assert!(report.is_empty());
        assert!(report.detailed().is_none());
        assert_eq!(
            serde_json::to_value(report.basic_output(&DefaultMessages)).unwrap(),
            json!({"valid": true})
        );
    }

    #[test]
    fn test_basic_output_shape() {
        let report = ErrorReport::from_tree(sample_tree());
        let out = serde_json::to_value(report.basic_output(&DefaultMessages)).unwrap();
        assert_eq!(out["valid"], false);
        assert_eq!(
            out["errors"][1],
            json!({
                "keywordLocation": "/properties/age/minimum",
                "absoluteKeywordLocation": "https://example.com/s.json#/properties/age/minimum",
                "instanceLocation": "/age",
                "error": "-1 is less than the minimum of 0",
                "kind": "minimum",
                "limit": 0
            })
        );
    }

    #[test]
    fn test_detailed_output_nests_containers() {
        let report = ErrorReport::from_tree(sample_tree());
        let out = serde_json::to_value(report.detailed_output(&DefaultMessages)).unwrap();
        let root = &out["errors"][0];
        assert!(root.get("error").is_none());
        assert!(root.get("kind").is_none());
        let props = &root["errors"][0];
        assert_eq!(props["keywordLocation"], "/properties");
        assert_eq!(props["errors"].as_array().unwrap().len(), 2);
        assert_eq!(props["errors"][0]["kind"], "type");
    }

    #[test]
    fn test_report_display_lists_entries() {
        let report = ErrorReport::from_tree(sample_tree());
        let display = report.to_string();
        assert!(display.contains("/name: 5 is not of type \"string\""));
        assert!(display.contains("/age: -1 is less than the minimum of 0"));
    }
}
