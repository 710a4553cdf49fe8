//! `required` and `properties`.

use jsv_core::CompileError;
use serde_json::Value;

use crate::compiler::{Compiler, Context};
use crate::error::ValidationErrorKind;
use crate::node::{SchemaNode, Validate};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

#[derive(Debug)]
pub(crate) struct RequiredNode {
    location: SchemaLocation,
    properties: Vec<String>,
}

impl RequiredNode {
    fn missing<'s>(&'s self, instance: &'s Value) -> impl Iterator<Item = &'s String> + 's {
        let object = instance.as_object();
        self.properties
            .iter()
            .filter(move |name| object.is_some_and(|o| !o.contains_key(name.as_str())))
    }
}

impl Validate for RequiredNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        self.missing(instance).next().is_none()
    }

    /// One missing property is a leaf; several are grouped, one leaf each.
    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let mut leaves: Vec<ErrorNode> = self
            .missing(instance)
            .map(|name| {
                let kind = ValidationErrorKind::Required {
                    property: name.clone(),
                };
                ErrorNode::leaf(&self.location, path, instance, kind)
            })
            .collect();
        if leaves.len() == 1 {
            leaves.remove(0)
        } else {
            ErrorNode::group(&self.location, path, leaves)
        }
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_required(value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    let invalid = || ctx.invalid("required", "expected an array of strings");
    let Value::Array(names) = value else {
        return Err(invalid());
    };
    let properties = names
        .iter()
        .map(|name| name.as_str().map(str::to_string).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SchemaNode::Required(RequiredNode {
        location: ctx.location(),
        properties,
    }))
}

/// `properties`: absent properties are not evaluated.
#[derive(Debug)]
pub(crate) struct PropertiesNode {
    location: SchemaLocation,
    properties: Vec<(String, SchemaNode)>,
}

impl PropertiesNode {
    fn present<'v>(&'v self, instance: &'v Value) -> impl Iterator<Item = (&'v str, &'v SchemaNode, &'v Value)> + 'v {
        let object = instance.as_object();
        self.properties.iter().filter_map(move |(name, schema)| {
            object
                .and_then(|o| o.get(name))
                .map(|value| (name.as_str(), schema, value))
        })
    }
}

impl Validate for PropertiesNode {
    fn is_valid(&self, nodes: &[SchemaNode], instance: &Value) -> bool {
        self.present(instance)
            .all(|(_, schema, value)| schema.is_valid(nodes, value))
    }

    fn explain(&self, nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let children = self
            .present(instance)
            .filter(|(_, schema, value)| !schema.is_valid(nodes, value))
            .map(|(name, schema, value)| schema.explain(nodes, value, &path.push_key(name)))
            .collect();
        ErrorNode::group(&self.location, path, children)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_properties(
    compiler: &mut Compiler<'_>,
    value: &Value,
    ctx: &Context,
) -> Result<SchemaNode, CompileError> {
    let Value::Object(map) = value else {
        return Err(ctx.invalid("properties", "expected an object of schemas"));
    };
    let properties = map
        .iter()
        .map(|(name, schema)| Ok((name.clone(), compiler.compile(schema, &ctx.descend(name))?)))
        .collect::<Result<Vec<_>, CompileError>>()?;
    Ok(SchemaNode::Properties(PropertiesNode {
        location: ctx.location(),
        properties,
    }))
}
