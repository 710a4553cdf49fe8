//! Human-readable messages for validation failures.
//!
//! The engine only produces [`ValidationErrorKind`]s. A
//! [`MessageFormatter`] renders them; [`DefaultMessages`] is the built-in
//! English rendering. Applications with their own string resources
//! implement the trait instead of patching the engine.

use serde_json::Value;

use crate::error::ValidationErrorKind;

/// Renders a failed check into display text.
pub trait MessageFormatter {
    /// Message for `kind` raised against `instance`.
    fn format(&self, kind: &ValidationErrorKind, instance: &Value) -> String;
}

/// English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageFormatter for DefaultMessages {
    fn format(&self, kind: &ValidationErrorKind, instance: &Value) -> String {
        use ValidationErrorKind as K;
        match kind {
            K::FalseSchema => format!("False schema does not allow {instance}"),
            K::Type { expected, .. } => {
                let names: Vec<String> = expected.iter().map(|t| format!("\"{t}\"")).collect();
                format!("{instance} is not of type {}", names.join(" or "))
            }
            K::Enum { options } => format!("{instance} is not one of {}", Value::from(options.clone())),
            K::Const { expected } => format!("{expected} was expected"),
            K::Format { format, detail: Some(detail) } => {
                format!("{instance} is not a \"{format}\": {detail}")
            }
            K::Format { format, detail: None } => format!("{instance} is not a \"{format}\""),
            K::Minimum { limit } => format!("{instance} is less than the minimum of {limit}"),
            K::Maximum { limit } => format!("{instance} is greater than the maximum of {limit}"),
            K::ExclusiveMinimum { limit } => {
                format!("{instance} is less than or equal to the minimum of {limit}")
            }
            K::ExclusiveMaximum { limit } => {
                format!("{instance} is greater than or equal to the maximum of {limit}")
            }
            K::MultipleOf { multiple_of } => format!("{instance} is not a multiple of {multiple_of}"),
            K::MinLength { limit } => format!("{instance} is shorter than {limit} character{}", plural(*limit)),
            K::MaxLength { limit } => format!("{instance} is longer than {limit} character{}", plural(*limit)),
            K::Pattern { pattern } => format!("{instance} does not match \"{pattern}\""),
            K::MinItems { limit } => format!("{instance} has fewer than {limit} item{}", plural(*limit)),
            K::MaxItems { limit } => format!("{instance} has more than {limit} item{}", plural(*limit)),
            K::Required { property } => format!("\"{property}\" is a required property"),
            K::Not => format!("{instance} should not be valid under the negated schema"),
            K::AnyOf => format!("{instance} is not valid under any of the given schemas"),
            K::OneOfNotValid => format!("{instance} is not valid under any of the given schemas"),
            K::OneOfMultipleValid { matched } => {
                let indices: Vec<String> = matched.iter().map(usize::to_string).collect();
                format!(
                    "{instance} is valid under more than one of the given schemas (branches {})",
                    indices.join(", ")
                )
            }
        }
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
