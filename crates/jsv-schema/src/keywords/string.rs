//! String length and `pattern`.

use jsv_core::{CompileError, SchemaError};
use regex::Regex;
use serde_json::Value;

use super::{non_negative_integer, Limit};
use crate::compiler::Context;
use crate::error::ValidationErrorKind;
use crate::node::{SchemaNode, Validate};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

/// `minLength` / `maxLength`, counted in Unicode scalar values.
#[derive(Debug)]
pub(crate) struct LengthNode {
    location: SchemaLocation,
    side: Limit,
    limit: u64,
}

impl Validate for LengthNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::String(s) => self.side.admits(s.chars().count() as u64, self.limit),
            _ => true,
        }
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = match self.side {
            Limit::Min => ValidationErrorKind::MinLength { limit: self.limit },
            Limit::Max => ValidationErrorKind::MaxLength { limit: self.limit },
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_length(keyword: &str, value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    Ok(SchemaNode::Length(LengthNode {
        location: ctx.location(),
        side: Limit::from_keyword(keyword),
        limit: non_negative_integer(keyword, value, ctx)?,
    }))
}

/// `pattern`: unanchored search.
#[derive(Debug)]
pub(crate) struct PatternNode {
    location: SchemaLocation,
    regex: Regex,
}

impl Validate for PatternNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::String(s) => self.regex.is_match(s),
            _ => true,
        }
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = ValidationErrorKind::Pattern {
            pattern: self.regex.as_str().to_string(),
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_pattern(value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    let Value::String(pattern) = value else {
        return Err(ctx.invalid("pattern", "expected a string"));
    };
    let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidRegex {
        location: ctx.absolute(),
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;
    Ok(SchemaNode::Pattern(PatternNode {
        location: ctx.location(),
        regex,
    }))
}
