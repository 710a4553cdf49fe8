//! `allOf`, `anyOf`, `oneOf`, `not` and `if`/`then`/`else`.
//!
//! Error selection: `allOf` nests every failing branch, so its first
//! failing branch is the blamed entry. `anyOf` and `oneOf` have no single
//! branch to blame; they report their own kind and nest the last branch's
//! explanation (none for `oneOf` when several branches matched).

use jsv_core::CompileError;
use serde_json::{Map, Value};

use super::schema_array;
use crate::compiler::{Compiler, Context};
use crate::error::ValidationErrorKind;
use crate::node::{explain_failing, SchemaNode, Validate};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

// -------------------------------------------------------------------------
// allOf
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct AllOfNode {
    location: SchemaLocation,
    branches: Vec<SchemaNode>,
}

impl AllOfNode {
    pub(crate) fn branches(&self) -> &[SchemaNode] {
        &self.branches
    }
}

impl Validate for AllOfNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        self.branches.iter().all(|b| b.is_valid(nodes, instance))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        ErrorNode::group(
            &self.location,
            path,
            explain_failing(&self.branches, nodes, instance, path),
        )
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_all_of(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::AllOf(AllOfNode {
        location: ctx.location(),
        branches: schema_array(compiler, "allOf", value, ctx)?,
    }))
}

// -------------------------------------------------------------------------
// anyOf
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct AnyOfNode {
    location: SchemaLocation,
    branches: Vec<SchemaNode>,
}

impl AnyOfNode {
    pub(crate) fn branches(&self) -> &[SchemaNode] {
        &self.branches
    }
}

impl Validate for AnyOfNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        self.branches.iter().any(|b| b.is_valid(nodes, instance))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let last = self
            .branches
            .last()
            .map(|b| b.explain(nodes, instance, path))
            .into_iter()
            .collect();
        ErrorNode::leaf(&self.location, path, instance, ValidationErrorKind::AnyOf).with_children(last)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_any_of(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::AnyOf(AnyOfNode {
        location: ctx.location(),
        branches: schema_array(compiler, "anyOf", value, ctx)?,
    }))
}

// -------------------------------------------------------------------------
// oneOf
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct OneOfNode {
    location: SchemaLocation,
    branches: Vec<SchemaNode>,
}

impl OneOfNode {
    pub(crate) fn branches(&self) -> &[SchemaNode] {
        &self.branches
    }

    fn matching(&self, nodes: &[SchemaNode], instance: &Value) -> Vec<usize> {
        self.branches
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_valid(nodes, instance))
            .map(|(i, _)| i)
            .collect()
    }
}

impl Validate for OneOfNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        let mut matched = self.branches.iter().filter(|b| b.is_valid(nodes, instance));
        matched.next().is_some() && matched.next().is_none()
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let matched = self.matching(nodes, instance);
        if matched.is_empty() {
            let last = self
                .branches
                .last()
                .map(|b| b.explain(nodes, instance, path))
                .into_iter()
                .collect();
            ErrorNode::leaf(&self.location, path, instance, ValidationErrorKind::OneOfNotValid).with_children(last)
        } else {
            ErrorNode::leaf(
                &self.location,
                path,
                instance,
                ValidationErrorKind::OneOfMultipleValid { matched },
            )
        }
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_one_of(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::OneOf(OneOfNode {
        location: ctx.location(),
        branches: schema_array(compiler, "oneOf", value, ctx)?,
    }))
}

// -------------------------------------------------------------------------
// not
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct NotNode {
    location: SchemaLocation,
    negated: Box<SchemaNode>,
}

impl NotNode {
    pub(crate) fn negated(&self) -> &SchemaNode {
        &self.negated
    }
}

impl Validate for NotNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        !self.negated.is_valid(nodes, instance)
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        ErrorNode::leaf(&self.location, path, instance, ValidationErrorKind::Not)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_not(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::Not(NotNode {
        location: ctx.location(),
        negated: Box::new(compiler.compile(value, ctx)?),
    }))
}

// -------------------------------------------------------------------------
// if / then / else
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct IfThenElseNode {
    location: SchemaLocation,
    condition: Box<SchemaNode>,
    then_branch: Option<Box<SchemaNode>>,
    else_branch: Option<Box<SchemaNode>>,
}

impl IfThenElseNode {
    pub(crate) fn children(&self) -> impl Iterator<Item = &SchemaNode> {
        std::iter::once(self.condition.as_ref())
            .chain(self.then_branch.as_deref())
            .chain(self.else_branch.as_deref())
    }

    /// The branch that applies to `instance`, if any.
    fn applicable(&self, nodes: &[SchemaNode], instance: &Value) -> Option<&SchemaNode> {
        if self.condition.is_valid(nodes, instance) {
            self.then_branch.as_deref()
        } else {
            self.else_branch.as_deref()
        }
    }
}

impl Validate for IfThenElseNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        self.applicable(nodes, instance)
            .map_or(true, |branch| branch.is_valid(nodes, instance))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let children = self
            .applicable(nodes, instance)
            .map(|branch| branch.explain(nodes, instance, path))
            .into_iter()
            .collect();
        ErrorNode::group(&self.location, path, children)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

/// `if` produces no node unless `then` or `else` accompanies it. It is
/// compiled either way, so errors inside it still surface.
/// `ctx` is the context of the enclosing schema object.
pub(crate) fn compile_if(
    compiler: &mut Compiler<'_>,
    value: &Value,
    schema: &Map<String, Value>,
    ctx: &Context,
) -> Result<Option<SchemaNode>, CompileError> {
    let then_value = schema.get("then");
    let else_value = schema.get("else");
    let if_ctx = ctx.descend("if");
    let condition = Box::new(compiler.compile(value, &if_ctx)?);
    if then_value.is_none() && else_value.is_none() {
        return Ok(None);
    }
    let then_branch = then_value
        .map(|v| compiler.compile(v, &ctx.descend("then")).map(Box::new))
        .transpose()?;
    let else_branch = else_value
        .map(|v| compiler.compile(v, &ctx.descend("else")).map(Box::new))
        .transpose()?;
    Ok(Some(SchemaNode::IfThenElse(IfThenElseNode {
        location: if_ctx.location(),
        condition,
        then_branch,
        else_branch,
    })))
}
