//! # jsv-schema — JSON Schema Compilation & Validation
//!
//! Compiles a JSON Schema document into an immutable validator graph and
//! checks JSON instances against it, producing structured, localizable
//! error reports.
//!
//! ## Pipeline
//!
//! - **Document cache** ([`registry`]): loads each schema document once
//!   per URI through an injected [`Retrieve`] collaborator, indexes every
//!   `$id` and anchor, and resolves `$ref`s across documents.
//! - **Compiler** (`compiler`): turns each recognized keyword into a node
//!   and gives every `$ref` target its own slot, so recursive schemas
//!   compile to a finite graph.
//! - **Validation**: [`Validator::is_valid`] is the boolean fast path.
//!   [`Validator::validate`] explains a failure once into an
//!   [`ErrorReport`] with basic (flat) and detailed (nested) shapes.
//! - **Messages** ([`messages`]): the engine emits a
//!   [`ValidationErrorKind`] with parameters; a [`MessageFormatter`]
//!   renders it.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["port"],
//!     "properties": {
//!         "port": {"type": "integer", "format": "int32", "minimum": 1}
//!     }
//! });
//! let validator = jsv_schema::Validator::new(&schema).expect("valid schema");
//!
//! assert!(validator.is_valid(&json!({"port": 8080})));
//!
//! let report = validator.validate(&json!({"port": 0})).unwrap_err();
//! assert_eq!(report.first().unwrap().instance_location.as_str(), "/port");
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `jsv-core` internally.
//! - Compile errors are fatal and surfaced from `build`; a non-conforming
//!   instance is never an error, only a non-empty report.
//! - A compiled [`Validator`] is immutable and shared across threads
//!   without locking. The [`Registry`] is the only shared mutable state.
//! - No logging subscriber is installed; events go through `tracing`.

mod compiler;
pub mod error;
pub mod formats;
mod keywords;
pub mod messages;
mod node;
mod options;
pub mod output;
pub mod paths;
pub mod registry;
mod validator;

pub use error::ValidationErrorKind;
pub use formats::{FormatCheck, FormatChecker, IntegerRange, StringFormat};
pub use jsv_core::{CompileError, JsonPointer, ResolutionError, SchemaError};
pub use messages::{DefaultMessages, MessageFormatter};
pub use options::ValidationOptions;
pub use output::{
    BasicOutput, DetailedOutput, DetailedUnit, ErrorEntry, ErrorNode, ErrorReport, Failure, OutputUnit,
};
pub use paths::SchemaLocation;
pub use registry::{MemoryRetriever, NoRetrieve, Registry, ResolvedRef, Retrieve, SchemaDocument};
pub use validator::Validator;

/// Start configuring a [`Validator`].
pub fn options() -> ValidationOptions {
    ValidationOptions::default()
}

/// Compile `schema` and check `instance` in one call.
///
/// # Errors
///
/// Returns a [`CompileError`] if the schema does not compile.
pub fn is_valid(schema: &serde_json::Value, instance: &serde_json::Value) -> Result<bool, CompileError> {
    Ok(Validator::new(schema)?.is_valid(instance))
}
