//! # Validation Error Kinds
//!
//! A failed check is reported as a [`ValidationErrorKind`]: which check
//! failed plus its positional parameters. The kind carries no display
//! text. Turning it into a message is the job of a
//! [`MessageFormatter`](crate::messages::MessageFormatter), so callers can
//! localize without the engine knowing about string resources.

use jsv_core::PrimitiveType;
use serde::Serialize;
use serde_json::{Number, Value};

/// Which check failed, with the parameters needed to describe it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValidationErrorKind {
    /// The `false` schema rejects everything.
    FalseSchema,
    /// `type` mismatch.
    Type {
        /// Declared type names.
        expected: Vec<PrimitiveType>,
        /// Most specific type of the instance.
        actual: PrimitiveType,
    },
    /// The instance is not a member of `enum`.
    Enum {
        /// Declared members.
        options: Vec<Value>,
    },
    /// The instance differs from `const`.
    Const {
        /// Declared value.
        expected: Value,
    },
    /// A registered format checker rejected the instance.
    Format {
        /// Format name.
        format: String,
        /// Optional detail from the checker (for example a range).
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    /// `minimum`
    Minimum {
        /// Inclusive lower bound.
        limit: Number,
    },
    /// `maximum`
    Maximum {
        /// Inclusive upper bound.
        limit: Number,
    },
    /// `exclusiveMinimum`
    ExclusiveMinimum {
        /// Exclusive lower bound.
        limit: Number,
    },
    /// `exclusiveMaximum`
    ExclusiveMaximum {
        /// Exclusive upper bound.
        limit: Number,
    },
    /// `multipleOf`
    MultipleOf {
        /// Required divisor.
        #[serde(rename = "multipleOf")]
        multiple_of: Number,
    },
    /// `minLength`, counted in Unicode scalar values.
    MinLength {
        /// Minimum length.
        limit: u64,
    },
    /// `maxLength`, counted in Unicode scalar values.
    MaxLength {
        /// Maximum length.
        limit: u64,
    },
    /// `pattern` did not match.
    Pattern {
        /// Source regular expression.
        pattern: String,
    },
    /// `minItems`
    MinItems {
        /// Minimum item count.
        limit: u64,
    },
    /// `maxItems`
    MaxItems {
        /// Maximum item count.
        limit: u64,
    },
    /// A `required` property is absent.
    Required {
        /// The missing property name.
        property: String,
    },
    /// The `not` subschema matched.
    Not,
    /// No `anyOf` branch matched.
    AnyOf,
    /// No `oneOf` branch matched.
    OneOfNotValid,
    /// More than one `oneOf` branch matched.
    OneOfMultipleValid {
        /// Indices of the matching branches.
        matched: Vec<usize>,
    },
}

impl ValidationErrorKind {
    /// Short, stable identifier for the kind (the serialized tag).
    pub fn code(&self) -> &'static str {
        match self {
            Self::FalseSchema => "falseSchema",
            Self::Type { .. } => "type",
            Self::Enum { .. } => "enum",
            Self::Const { .. } => "const",
            Self::Format { .. } => "format",
            Self::Minimum { .. } => "minimum",
            Self::Maximum { .. } => "maximum",
            Self::ExclusiveMinimum { .. } => "exclusiveMinimum",
            Self::ExclusiveMaximum { .. } => "exclusiveMaximum",
            Self::MultipleOf { .. } => "multipleOf",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Pattern { .. } => "pattern",
            Self::MinItems { .. } => "minItems",
            Self::MaxItems { .. } => "maxItems",
            Self::Required { .. } => "required",
            Self::Not => "not",
            Self::AnyOf => "anyOf",
            Self::OneOfNotValid => "oneOfNotValid",
            Self::OneOfMultipleValid { .. } => "oneOfMultipleValid",
        }
    }
}
