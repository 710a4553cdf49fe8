//! Numeric bounds and `multipleOf`.

use std::cmp::Ordering;

use jsv_core::{compare_numbers, is_multiple_of, CompileError};
use serde_json::{Number, Value};

use crate::compiler::Context;
use crate::error::ValidationErrorKind;
use crate::node::{SchemaNode, Validate};
use crate::output::ErrorNode;
use crate::paths::{InstancePath, SchemaLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
}

impl Bound {
    fn admits(self, ordering: Ordering) -> bool {
        match self {
            Self::Minimum => ordering != Ordering::Less,
            Self::Maximum => ordering != Ordering::Greater,
            Self::ExclusiveMinimum => ordering == Ordering::Greater,
            Self::ExclusiveMaximum => ordering == Ordering::Less,
        }
    }
}

/// `minimum`, `maximum`, `exclusiveMinimum` and `exclusiveMaximum`.
#[derive(Debug)]
pub(crate) struct BoundNode {
    location: SchemaLocation,
    bound: Bound,
    limit: Number,
}

impl Validate for BoundNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::Number(n) => compare_numbers(n, &self.limit).map_or(true, |o| self.bound.admits(o)),
            _ => true,
        }
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let limit = self.limit.clone();
        let kind = match self.bound {
            Bound::Minimum => ValidationErrorKind::Minimum { limit },
            Bound::Maximum => ValidationErrorKind::Maximum { limit },
            Bound::ExclusiveMinimum => ValidationErrorKind::ExclusiveMinimum { limit },
            Bound::ExclusiveMaximum => ValidationErrorKind::ExclusiveMaximum { limit },
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_bound(keyword: &str, value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    let bound = match keyword {
        "minimum" => Bound::Minimum,
        "maximum" => Bound::Maximum,
        "exclusiveMinimum" => Bound::ExclusiveMinimum,
        _ => Bound::ExclusiveMaximum,
    };
    let Value::Number(limit) = value else {
        return Err(ctx.invalid(keyword, "expected a number"));
    };
    Ok(SchemaNode::Bound(BoundNode {
        location: ctx.location(),
        bound,
        limit: limit.clone(),
    }))
}

#[derive(Debug)]
pub(crate) struct MultipleOfNode {
    location: SchemaLocation,
    divisor: Number,
}

impl Validate for MultipleOfNode {
    fn is_valid(&self, _nodes: &[SchemaNode], instance: &Value) -> bool {
        match instance {
            Value::Number(n) => is_multiple_of(n, &self.divisor),
            _ => true,
        }
    }

    fn explain(&self, _nodes: &[SchemaNode], instance: &Value, path: &InstancePath<'_>) -> ErrorNode {
        let kind = ValidationErrorKind::MultipleOf {
            multiple_of: self.divisor.clone(),
        };
        ErrorNode::leaf(&self.location, path, instance, kind)
    }

    fn location(&self) -> &SchemaLocation {
        &self.location
    }
}

pub(crate) fn compile_multiple_of(value: &Value, ctx: &Context) -> Result<SchemaNode, CompileError> {
    match value {
        Value::Number(divisor) if divisor.as_f64().is_some_and(|d| d > 0.0) => {
            Ok(SchemaNode::MultipleOf(MultipleOfNode {
                location: ctx.location(),
                divisor: divisor.clone(),
            }))
        }
        _ => Err(ctx.invalid("multipleOf", "expected a number strictly greater than 0")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_core::JsonPointer;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    fn ctx(keyword: &str) -> Context {
        let doc = Url::parse("https://example.com/s.json").unwrap();
        Context::new(Arc::new(doc.clone()), doc, JsonPointer::root().push_key(keyword))
    }

    fn bound(keyword: &str, limit: Value) -> SchemaNode {
        compile_bound(keyword, &limit, &ctx(keyword)).unwrap()
    }

    #[test]
    fn test_bounds_compare_exactly() {
        let max = bound("maximum", json!(u64::MAX));
        assert!(max.is_valid(&[], &json!(u64::MAX)));
        assert!(!max.is_valid(&[], &json!(1.9e19)));
        let exclusive = bound("exclusiveMinimum", json!(-1));
        assert!(!exclusive.is_valid(&[], &json!(-1.0)));
        assert!(exclusive.is_valid(&[], &json!(-0.5)));
        assert!(exclusive.is_valid(&[], &json!("-5")));
    }

    #[test]
    fn test_multiple_of_rejects_non_positive_divisor() {
        for divisor in [json!(0), json!(-0.5), json!("2")] {
            assert!(compile_multiple_of(&divisor, &ctx("multipleOf")).is_err());
        }
        let node = compile_multiple_of(&json!(0.25), &ctx("multipleOf")).unwrap();
        assert!(node.is_valid(&[], &json!(1.75)));
        assert!(!node.is_valid(&[], &json!(1.8)));
    }
}
