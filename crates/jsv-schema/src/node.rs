//! # Compiled Validator Nodes
//!
//! A compiled schema is a vector of [`SchemaNode`] trees. Slot 0 holds the
//! root subschema; every other slot holds a `$ref` target. Inside a tree,
//! children are owned by exactly one parent. A `$ref` is a [`RefNode`]
//! holding only the slot index of its target, which is how recursive and
//! cross-document schemas compile without re-expanding.
//!
//! Every node answers three questions through [`Validate`]:
//!
//! - `is_valid`: the fast boolean path, no allocation.
//! - `explain`: called only after `is_valid` returned false for the same
//!   instance, rebuilds the exact failure as an [`ErrorNode`].
//! - `location`: the schema location baked in at compile time.

use serde_json::Value;

use crate::error::ValidationErrorKind;
use crate::keywords::array::{ItemCountNode, ItemsNode};
use crate::keywords::combinators::{AllOfNode, AnyOfNode, IfThenElseNode, NotNode, OneOfNode};
use crate::keywords::numeric::{BoundNode, MultipleOfNode};
use crate::keywords::object::{PropertiesNode, RequiredNode};
use crate::keywords::string::{LengthNode, PatternNode};
use crate::keywords::types::{ConstNode, EnumNode, FormatNode, TypeNode};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

/// The capability set shared by every node kind.
pub(crate) trait Validate {
    /// Returns true if `instance` satisfies this node.
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool;

    /// Explain a failure. Only called after `is_valid` returned false.
    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode;

    /// Where this node was compiled from.
    fn location(&self) -> &SchemaLocation;
}

/// Every node kind the compiler can produce.
#[derive(Debug)]
pub(crate) enum SchemaNode {
    Bool(BoolNode),
    Keywords(KeywordsNode),
    Ref(RefNode),
    Type(TypeNode),
    Enum(EnumNode),
    Const(ConstNode),
    Format(FormatNode),
    Bound(BoundNode),
    MultipleOf(MultipleOfNode),
    Length(LengthNode),
    Pattern(PatternNode),
    ItemCount(ItemCountNode),
    Required(RequiredNode),
    Properties(PropertiesNode),
    Items(ItemsNode),
    AllOf(AllOfNode),
    AnyOf(AnyOfNode),
    OneOf(OneOfNode),
    Not(NotNode),
    IfThenElse(IfThenElseNode),
}

macro_rules! dispatch {
    ($node:expr, $inner:ident => $body:expr) => {
        match $node {
            SchemaNode::Bool($inner) => $body,
            SchemaNode::Keywords($inner) => $body,
            SchemaNode::Ref($inner) => $body,
            SchemaNode::Type($inner) => $body,
            SchemaNode::Enum($inner) => $body,
            SchemaNode::Const($inner) => $body,
            SchemaNode::Format($inner) => $body,
            SchemaNode::Bound($inner) => $body,
            SchemaNode::MultipleOf($inner) => $body,
            SchemaNode::Length($inner) => $body,
            SchemaNode::Pattern($inner) => $body,
            SchemaNode::ItemCount($inner) => $body,
            SchemaNode::Required($inner) => $body,
            SchemaNode::Properties($inner) => $body,
            SchemaNode::Items($inner) => $body,
            SchemaNode::AllOf($inner) => $body,
            SchemaNode::AnyOf($inner) => $body,
            SchemaNode::OneOf($inner) => $body,
            SchemaNode::Not($inner) => $body,
            SchemaNode::IfThenElse($inner) => $body,
        }
    };
}

impl Validate for SchemaNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        dispatch!(self, node => node.is_valid(nodes, instance))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        dispatch!(self, node => node.explain(nodes, instance, path))
    }

    fn location(&self) -> &SchemaLocation {
        dispatch!(self, node => node.location())
    }
}

impl SchemaNode {
    /// `$ref`s reachable from this node without descending into the
    /// instance (through keyword sets and combinators, not through
    /// `properties` or `items`).
    pub(crate) fn in_place_refs<'n>(&'n self, out: &mut Vec<&'n RefNode>) {
        match self {
            SchemaNode::Ref(node) => out.push(node),
            SchemaNode::Keywords(node) => node.keywords.iter().for_each(|c| c.in_place_refs(out)),
            SchemaNode::AllOf(node) => node.branches().iter().for_each(|c| c.in_place_refs(out)),
            SchemaNode::AnyOf(node) => node.branches().iter().for_each(|c| c.in_place_refs(out)),
            SchemaNode::OneOf(node) => node.branches().iter().for_each(|c| c.in_place_refs(out)),
            SchemaNode::Not(node) => node.negated().in_place_refs(out),
            SchemaNode::IfThenElse(node) => node.children().for_each(|c| c.in_place_refs(out)),
            _ => {}
        }
    }
}

/// Explain every child of a container that fails on `instance`.
pub(crate) fn explain_failing(
    children: &[SchemaNode],
    nodes: &[SchemaNode],
    instance: &Value,
    path: &InstancePath<'_>,
) -> Vec<ErrorNode> {
    children
        .iter()
        .filter(|child| !child.is_valid(nodes, instance))
        .map(|child| child.explain(nodes, instance, path))
        .collect()
}

// -------------------------------------------------------------------------
// Boolean schemas
// -------------------------------------------------------------------------

/// `true` accepts everything, `false` rejects everything.
#[derive(Debug)]
pub(crate) struct BoolNode {
    pub(crate) location: SchemaLocation,
    pub(crate) valid: bool,
}

impl Validate for BoolNode {
    fn is_valid(&self, _nodes: &[SchemaNode], _instance: &Value) -> bool {
        self.valid
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        ErrorNode::leaf(&self.location, path, instance, ValidationErrorKind::FalseSchema)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

// -------------------------------------------------------------------------
// Subschema objects
// -------------------------------------------------------------------------

/// All keywords of one schema object, applied as an implicit `allOf`.
#[derive(Debug)]
pub(crate) struct KeywordsNode {
    pub(crate) location: SchemaLocation,
    pub(crate) keywords: Vec<SchemaNode>,
}

impl Validate for KeywordsNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        self.keywords.iter().all(|k| k.is_valid(nodes, instance))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        ErrorNode::group(
            &self.location,
            path,
            explain_failing(&self.keywords, nodes, instance, path),
        )
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

// -------------------------------------------------------------------------
// References
// -------------------------------------------------------------------------

/// `$ref`: delegates to the compiled target in another slot.
#[derive(Debug)]
pub(crate) struct RefNode {
    pub(crate) location: SchemaLocation,
    pub(crate) target: usize,
}

impl Validate for RefNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        nodes[self.target].is_valid(nodes, instance)
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let target = &nodes[self.target];
        let mut child = target.explain(nodes, instance, path);
        child.rebase(target.location().pointer(), self.location.pointer());
        ErrorNode::group(&self.location, path, vec![child])
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}
