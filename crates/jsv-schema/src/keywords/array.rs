//! `items`, `minItems` and `maxItems`.

use jsv_core::CompileError;
use serde_json::Value;

use super::{non_negative_integer, schema_array, Limit};
use crate::compiler::{Compiler, Context};
use crate::error::ValidationErrorKind;
use crate::node::{SchemaNode, Validate};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

#[derive(Debug)]
pub(crate) struct ItemCountNode {
    location: SchemaLocation,
    side: Limit,
    limit: u64,
}

impl Validate for ItemCountNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::Array(items) => self.side.admits(items.len() as u64, self.limit),
            _ => true,
        }
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = match self.side {
            Limit::Min => ValidationErrorKind::MinItems { limit: self.limit },
            Limit::Max => ValidationErrorKind::MaxItems { limit: self.limit },
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_item_count(keyword: &str, value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::ItemCount(ItemCountNode {
        location: ctx.location(),
        side: Limit::from_keyword(keyword),
        limit: non_negative_integer(keyword, value, ctx)?,
    }))
}

/// The two forms of `items`.
#[derive(Debug)]
pub(crate) enum Items {
    /// One schema applied to every element.
    Uniform(Box<SchemaNode>),
    /// Schema `i` applies to element `i`; extra elements are unconstrained.
    Positional(Vec<SchemaNode>),
}

#[derive(Debug)]
pub(crate) struct ItemsNode {
    location: SchemaLocation,
    items: Items,
}

impl ItemsNode {
    fn pairs<'v>(&'v self, elements: &'v [Value]) -> impl Iterator<Item = (usize, &'v SchemaNode, &'v Value)> + 'v {
        let schemas: Box<dyn Iterator<Item = &'v SchemaNode> + 'v> = match &self.items {
            Items::Uniform(schema) => Box::new(std::iter::repeat(schema.as_ref())),
            Items::Positional(schemas) => Box::new(schemas.iter()),
        };
        schemas
            .zip(elements)
            .enumerate()
            .map(|(i, (schema, element))| (i, schema, element))
    }
}

impl Validate for ItemsNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::Array(elements) => self
                .pairs(elements)
                .all(|(_, schema, element)| schema.is_valid(nodes, element)),
            _ => true,
        }
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let children = match instance {
            Value::Array(elements) => self
                .pairs(elements)
                .filter(|(_, schema, element)| !schema.is_valid(nodes, element))
                .map(|(i, schema, element)| schema.explain(nodes, element, &path.push_index(i)))
                .collect(),
            _ => Vec::new(),
        };
        ErrorNode::group(&self.location, path, children)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_items(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    let items = match value {
        Value::Array(schemas) if schemas.is_empty() => Items::Positional(Vec::new()),
        Value::Array(_) => Items::Positional(schema_array(compiler, "items", value, ctx)?),
        Value::Bool(_) | Value::Object(_) => Items::Uniform(Box::new(compiler.compile(value, ctx)?)),
        _ => return Err(ctx.invalid("items", "expected a schema or an array of schemas")),
    };
    Ok(SchemaNode::Items(ItemsNode {
        location: ctx.location(),
        items,
    }))
}
