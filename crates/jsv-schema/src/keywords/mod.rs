//! Keyword nodes, grouped by what they constrain.
//!
//! Each submodule provides the node types for its keywords plus the
//! `compile_*` functions that shape-check a keyword value and build the
//! node. Type-specific keywords accept instances of every other type.

pub(crate) mod array;
pub(crate) mod combinators;
pub(crate) mod numeric;
pub(crate) mod object;
pub(crate) mod string;
pub(crate) mod types;

use jsv_core::CompileError;
use serde_json::Value;

use crate::compiler::{Compiler, Context};
use crate::node::SchemaNode;

/// Which side of a size keyword (`minLength`, `maxItems`, ...) a node checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Limit {
    Min,
    Max,
}

impl Limit {
    pub(crate) fn from_keyword(keyword: &str) -> Self {
        if keyword.starts_with("min") {
            Self::Min
        } else {
            Self::Max
        }
    }

    pub(crate) fn admits(self, actual: u64, limit: u64) -> bool {
        match self {
            Self::Min => actual >= limit,
            Self::Max => actual <= limit,
        }
    }
}

/// A non-negative integer keyword value. `2.0` is accepted as `2`.
pub(crate) fn non_negative_integer(keyword: &str, value: &Value, ctx: &Context) -> Result<u64, CompileError> {
    let Value::Number(n) = value else {
        return Err(ctx.invalid(keyword, "expected a non-negative integer"));
    };
    if let Some(limit) = n.as_u64() {
        return Ok(limit);
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f % 1.0 == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(ctx.invalid(keyword, "expected a non-negative integer")),
    }
}

/// Compile every member of a non-empty array of schemas.
pub(crate) fn schema_array(
    compiler: &mut Compiler<'_>,
    keyword: &str,
    value: &Value,
    ctx: &Context,
) -> Result<Vec<SchemaNode>, CompileError> {
    match value {
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, item)| compiler.compile(item, &ctx.descend_index(i)))
            .collect(),
        _ => Err(ctx.invalid(keyword, "expected a non-empty array of schemas")),
    }
}
