//! # Schema Compiler
//!
//! Walks a schema value and produces the [`SchemaNode`] slots a
//! [`Validator`](crate::Validator) runs. Each recognized keyword of a
//! schema object compiles into one child node; the children are wrapped
//! in a [`KeywordsNode`] located at the subschema.
//!
//! ## `$ref` and cycles
//!
//! A `$ref` target is compiled once into its own slot, keyed by
//! `(document URI, pointer)`. The slot is reserved before the target is
//! compiled, so a reference back into a schema that is still being
//! compiled resolves to the reserved index instead of recursing. After
//! compilation every slot must be filled; a reference chain that loops
//! without descending into the instance (for example `{"$ref": "#"}`) is
//! rejected because evaluating it would never terminate.

use std::collections::HashMap;
use std::sync::Arc;

use jsv_core::{CompileError, JsonPointer, PrimitiveType, SchemaError};
use serde_json::{Map, Value};
use url::Url;

use crate::keywords::{array, combinators, numeric, object, string, types};
use crate::node::{BoolNode, KeywordsNode, RefNode, SchemaNode, Validate};
use crate::options::ValidationOptions;
use crate::paths::{absolute_uri, SchemaLocation};
use crate::registry::{strip_fragment, Registry};

/// Keywords that carry no validation of their own.
const INFORMATIONAL: &[&str] = &[
    "$id",
    "$schema",
    "$anchor",
    "$defs",
    "definitions",
    "$comment",
    "title",
    "description",
    "default",
    "examples",
];

/// Where the compiler currently is: the document, the base URI for
/// relative references, and the pointer of the current schema value.
#[derive(Debug, Clone)]
pub(crate) struct Context {
    document: Arc<Url>,
    base: Url,
    pointer: JsonPointer,
}

impl Context {
    pub(crate) fn new(document: Arc<Url>, base: Url, pointer: JsonPointer) -> Self {
        Self {
            document,
            base,
            pointer,
        }
    }

    pub(crate) fn descend(&self, key: &str) -> Self {
        Self {
            document: Arc::clone(&self.document),
            base: self.base.clone(),
            pointer: self.pointer.push_key(key),
        }
    }

    pub(crate) fn descend_index(&self, index: usize) -> Self {
        Self {
            document: Arc::clone(&self.document),
            base: self.base.clone(),
            pointer: self.pointer.push_index(index),
        }
    }

    pub(crate) fn with_base(&self, base: Url) -> Self {
        Self {
            document: Arc::clone(&self.document),
            base,
            pointer: self.pointer.clone(),
        }
    }

    pub(crate) fn base(&self) -> &Url {
        &self.base
    }

    pub(crate) fn location(&self) -> SchemaLocation {
        SchemaLocation::new(Arc::clone(&self.document), self.pointer.clone())
    }

    pub(crate) fn absolute(&self) -> String {
        absolute_uri(&self.document, &self.pointer)
    }

    /// A malformed-keyword error located at this context.
    pub(crate) fn invalid(&self, keyword: &str, reason: impl Into<String>) -> CompileError {
        SchemaError::InvalidKeyword {
            location: self.absolute(),
            keyword: keyword.to_string(),
            reason: reason.into(),
        }
        .into()
    }
}

/// Builds the node slots for one root schema.
pub(crate) struct Compiler<'a> {
    registry: &'a Registry,
    options: &'a ValidationOptions,
    arena: Vec<Option<SchemaNode>>,
    slots: HashMap<(Url, JsonPointer), usize>,
    documents: HashMap<Url, Arc<Url>>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(registry: &'a Registry, options: &'a ValidationOptions) -> Self {
        Self {
            registry,
            options,
            arena: Vec::new(),
            slots: HashMap::new(),
            documents: HashMap::new(),
        }
    }

    /// Compile `schema` as the root of `document` and return the finished
    /// slots. The root is slot 0.
    pub(crate) fn compile_document(
        mut self,
        document: &Url,
        base: Url,
        schema: &Value,
    ) -> Result<Vec<SchemaNode>, CompileError> {
        self.compile_target(document, JsonPointer::root(), base, schema)?;
        let nodes = self
            .arena
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                CompileError::from(SchemaError::InvalidKeyword {
                    location: format!("{document}#"),
                    keyword: "$ref".to_string(),
                    reason: "reference target was never compiled".to_string(),
                })
            })?;
        check_cycles(&nodes)?;
        Ok(nodes)
    }

    fn intern(&mut self, document: &Url) -> Arc<Url> {
        Arc::clone(
            self.documents
                .entry(document.clone())
                .or_insert_with(|| Arc::new(document.clone())),
        )
    }

    /// Compile the schema at `(document, pointer)` into its own slot, or
    /// return the slot it already has.
    fn compile_target(
        &mut self,
        document: &Url,
        pointer: JsonPointer,
        base: Url,
        schema: &Value,
    ) -> Result<usize, CompileError> {
        let key = (document.clone(), pointer);
        if let Some(&index) = self.slots.get(&key) {
            return Ok(index);
        }
        let index = self.arena.len();
        self.arena.push(None);
        let ctx = Context::new(self.intern(document), base, key.1.clone());
        self.slots.insert(key, index);
        let node = self.compile(schema, &ctx)?;
        self.arena[index] = Some(node);
        Ok(index)
    }

    /// Compile a (sub)schema located at `ctx`.
    pub(crate) fn compile(&mut self, schema: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
        match schema {
            Value::Bool(valid) => Ok(SchemaNode::Bool(BoolNode {
                location: ctx.location(),
                valid: *valid,
            })),
            Value::Object(map) => self.compile_object(map, ctx),
            other => Err(SchemaError::InvalidSchema {
                location: ctx.absolute(),
                found: PrimitiveType::of(other).to_string(),
            }
            .into()),
        }
    }

    fn compile_object(&mut self, map: &Map<String, Value>, ctx: &Context) -> Result<SchemaNode, CompileError> {
        let ctx = match map.get("$id") {
            None => ctx.clone(),
            Some(Value::String(id)) if id.starts_with('#') => ctx.clone(),
            Some(Value::String(id)) => {
                let base = ctx.base().join(id).map_err(|e| {
                    ctx.descend("$id").invalid("$id", format!("cannot resolve '{id}': {e}"))
                })?;
                ctx.with_base(strip_fragment(&base))
            }
            Some(_) => return Err(ctx.descend("$id").invalid("$id", "expected a string")),
        };
        if let Some(anchor) = map.get("$anchor") {
            if !anchor.is_string() {
                return Err(ctx.descend("$anchor").invalid("$anchor", "expected a string"));
            }
        }

        let mut keywords = Vec::new();
        for (keyword, value) in map {
            let kctx = ctx.descend(keyword);
            let node = match keyword.as_str() {
                "$ref" => Some(self.compile_ref(value, &kctx)?),
                "type" => Some(types::compile_type(value, &kctx)?),
                "enum" => Some(types::compile_enum(value, &kctx)?),
                "const" => Some(types::compile_const(value, &kctx)),
                "format" => types::compile_format(value, &kctx, self.options)?,
                "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
                    Some(numeric::compile_bound(keyword, value, &kctx)?)
                }
                "multipleOf" => Some(numeric::compile_multiple_of(value, &kctx)?),
                "minLength" | "maxLength" => Some(string::compile_length(keyword, value, &kctx)?),
                "pattern" => Some(string::compile_pattern(value, &kctx)?),
                "minItems" | "maxItems" => Some(array::compile_item_count(keyword, value, &kctx)?),
                "items" => Some(array::compile_items(self, value, &kctx)?),
                "required" => Some(object::compile_required(value, &kctx)?),
                "properties" => Some(object::compile_properties(self, value, &kctx)?),
                "allOf" => Some(combinators::compile_all_of(self, value, &kctx)?),
                "anyOf" => Some(combinators::compile_any_of(self, value, &kctx)?),
                "oneOf" => Some(combinators::compile_one_of(self, value, &kctx)?),
                "not" => Some(combinators::compile_not(self, value, &kctx)?),
                "if" => combinators::compile_if(self, value, map, &ctx)?,
                "then" | "else" if map.contains_key("if") => None,
                "then" | "else" => {
                    // Without `if` the branch never applies; compile it for its errors only.
                    self.compile(value, &kctx)?;
                    None
                }
                other if INFORMATIONAL.contains(&other) => None,
                other if self.options.strict => {
                    return Err(SchemaError::UnknownKeyword {
                        location: kctx.absolute(),
                        keyword: other.to_string(),
                    }
                    .into());
                }
                other => {
                    tracing::trace!(keyword = other, location = %kctx.absolute(), "ignoring unknown keyword");
                    None
                }
            };
            keywords.extend(node);
        }
        Ok(SchemaNode::Keywords(KeywordsNode {
            location: ctx.location(),
            keywords,
        }))
    }

    fn compile_ref(&mut self, value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
        let Value::String(reference) = value else {
            return Err(ctx.invalid("$ref", "expected a string"));
        };
        let resolved = self.registry.resolve_ref(ctx.base(), reference)?;
        let target = self.compile_target(
            resolved.document(),
            resolved.pointer().clone(),
            resolved.base().clone(),
            resolved.contents(),
        )?;
        Ok(SchemaNode::Ref(RefNode {
            location: ctx.location(),
            target,
        }))
    }
}

/// Reject `$ref` loops that never descend into the instance.
fn check_cycles(nodes: &[SchemaNode]) -> Result<(), CompileError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    fn visit(nodes: &[SchemaNode], slot: usize, marks: &mut [Mark]) -> Result<(), CompileError> {
        marks[slot] = Mark::InProgress;
        let mut refs = Vec::new();
        nodes[slot].in_place_refs(&mut refs);
        for reference in refs {
            match marks[reference.target] {
                Mark::InProgress => {
                    return Err(SchemaError::InvalidKeyword {
                        location: reference.location().absolute(),
                        keyword: "$ref".to_string(),
                        reason: "reference cycle does not consume any input".to_string(),
                    }
                    .into());
                }
                Mark::Unvisited => visit(nodes, reference.target, marks)?,
                Mark::Done => {}
            }
        }
        marks[slot] = Mark::Done;
        Ok(())
    }

    let mut marks = vec![Mark::Unvisited; nodes.len()];
    for slot in 0..nodes.len() {
        if marks[slot] == Mark::Unvisited {
            visit(nodes, slot, &mut marks)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(schema: Value) -> Result<Vec<SchemaNode>, CompileError> {
        let options = ValidationOptions::default();
        let registry = Registry::new();
        let uri = Url::parse("https://example.com/root.json").unwrap();
        registry.insert(&uri, schema.clone()).unwrap();
        Compiler::new(&registry, &options).compile_document(&uri, uri.clone(), &schema)
    }

    #[test]
    fn test_root_is_slot_zero() {
        let nodes = compile(json!({"type": "string"})).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].location().pointer().as_str(), "");
    }

    #[test]
    fn test_ref_targets_get_their_own_slot_once() {
        let nodes = compile(json!({
            "properties": {
                "a": {"$ref": "#/$defs/pos"},
                "b": {"$ref": "#/$defs/pos"}
            },
            "$defs": {"pos": {"minimum": 0}}
        }))
        .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].location().pointer().as_str(), "/$defs/pos");
    }

    #[test]
    fn test_recursive_ref_through_properties_compiles() {
        let nodes = compile(json!({
            "properties": {"child": {"$ref": "#"}}
        }))
        .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_in_place_cycle_is_rejected() {
        let err = compile(json!({"$ref": "#"})).unwrap_err();
        assert!(err.to_string().contains("reference cycle"));

        let err = compile(json!({
            "$defs": {
                "a": {"allOf": [{"$ref": "#/$defs/b"}]},
                "b": {"anyOf": [{"$ref": "#/$defs/a"}]}
            },
            "$ref": "#/$defs/a"
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::Schema(SchemaError::InvalidKeyword { .. })));
    }

    #[test]
    fn test_invalid_schema_value() {
        let err = compile(json!({"not": 5})).unwrap_err();
        assert_eq!(
            err,
            CompileError::Schema(SchemaError::InvalidSchema {
                location: "https://example.com/root.json#/not".to_string(),
                found: "integer".to_string(),
            })
        );
    }

    #[test]
    fn test_context_locations() {
        let doc = Arc::new(Url::parse("https://example.com/s.json").unwrap());
        let ctx = Context::new(Arc::clone(&doc), (*doc).clone(), JsonPointer::root());
        let child = ctx.descend("items").descend_index(1);
        assert_eq!(child.absolute(), "https://example.com/s.json#/items/1");
        assert_eq!(child.location().pointer().as_str(), "/items/1");
    }
}
