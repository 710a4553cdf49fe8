//! `type`, `enum`, `const` and `format`.

use std::fmt;
use std::sync::Arc;

use jsv_core::{json_equal, CompileError, PrimitiveType};
use serde_json::Value;

use crate::compiler::Context;
use crate::error::ValidationErrorKind;
use crate::formats::{self, FormatCheck, FormatChecker};
use crate::node::{SchemaNode, Validate};
use crate::options::ValidationOptions;
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

// -------------------------------------------------------------------------
// type
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct TypeNode {
    location: SchemaLocation,
    types: Vec<PrimitiveType>,
}

impl Validate for TypeNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        self.types.iter().any(|t| t.matches(instance))
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = ValidationErrorKind::Type {
            expected: self.types.clone(),
            actual: PrimitiveType::of(instance),
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_type(value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    let parse = |name: &Value| -> Result<PrimitiveType, CompileError> {
        match name {
            Value::String(name) => name.parse().map_err(|e: jsv_core::UnknownType| ctx.invalid("type", e.to_string())),
            _ => Err(ctx.invalid("type", "expected a type name")),
        }
    };
    let types = match value {
        Value::String(_) => vec![parse(value)?],
        Value::Array(names) if !names.is_empty() => names.iter().map(parse).collect::<Result<_, _>>()?,
        _ => return Err(ctx.invalid("type", "expected a type name or a non-empty array of type names")),
    };
    Ok(SchemaNode::Type(TypeNode {
        location: ctx.location(),
        types,
    }))
}

// -------------------------------------------------------------------------
// enum / const
// -------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct EnumNode {
    location: SchemaLocation,
    options: Vec<Value>,
}

impl Validate for EnumNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        self.options.iter().any(|option| json_equal(option, instance))
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = ValidationErrorKind::Enum {
            options: self.options.clone(),
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_enum(value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    let Value::Array(options) = value else {
        return Err(ctx.invalid("enum", "expected an array"));
    };
    Ok(SchemaNode::Enum(EnumNode {
        location: ctx.location(),
        options: options.clone(),
    }))
}

#[derive(Debug)]
pub(crate) struct ConstNode {
    location: SchemaLocation,
    expected: Value,
}

impl Validate for ConstNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        json_equal(&self.expected, instance)
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = ValidationErrorKind::Const {
            expected: self.expected.clone(),
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_const(value: &Value, ctx: &Context) -> SchemaNode {
    SchemaNode::Const(ConstNode {
        location: ctx.location(),
        expected: value.clone(),
    })
}

// -------------------------------------------------------------------------
// format
// -------------------------------------------------------------------------

pub(crate) struct FormatNode {
    location: SchemaLocation,
    name: String,
    checker: Arc<dyn FormatChecker>,
}

impl fmt::Debug for FormatNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatNode")
            .field("location", &self.location)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Validate for FormatNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        self.checker.check(instance).is_valid()
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let detail = match self.checker.check(instance) {
            FormatCheck::Invalid { detail } => detail,
            FormatCheck::Valid => None,
        };
        let kind = ValidationErrorKind::Format {
            format: self.name.clone(),
            detail,
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

/// `None` when the format is unknown or format validation is off; such a
/// keyword accepts everything.
pub(crate) fn compile_format(
    value: &Value,
    ctx: &Context,
    options: &ValidationOptions,
) -> Result<Option<SchemaNode>, CompileError> {
    let Value::String(name) = value else {
        return Err(ctx.invalid("format", "expected a string"));
    };
    if !options.validate_formats {
        return Ok(None);
    }
    let checker = options.formats.get(name).cloned().or_else(|| formats::builtin(name));
    let Some(checker) = checker else {
        tracing::debug!(format = %name, location = %ctx.absolute(), "ignoring unknown format");
        return Ok(None);
    };
    Ok(Some(SchemaNode::Format(FormatNode {
        location: ctx.location(),
        name: name.clone(),
        checker,
    })))
}
