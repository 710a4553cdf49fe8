//! # Error Types — Compile-Time Error Hierarchy
//!
//! Defines the errors that abort schema compilation. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Resolution errors name the URI and the pointer or anchor that could
//!   not be located, so a dangling `$ref` can be traced to its target.
//! - Schema errors name the absolute schema location (`uri#pointer`) of
//!   the malformed keyword.
//! - A failing *instance* is not an error at all: validation returns a
//!   boolean or a report, never one of these types.

use thiserror::Error;

/// Top-level error type for the jsv workspace.
#[derive(Error, Debug)]
pub enum JsvError {
    /// Schema compilation failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A YAML document could not be converted into the JSON value model.
    #[error("yaml conversion error: {0}")]
    Yaml(String),
}

/// Any error that aborts compilation of a schema into a validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A `$ref` or `$id` target could not be located or loaded.
    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// A keyword value has the wrong shape for that keyword.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// A reference target could not be found.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// The retrieval collaborator returned nothing for this URI.
    #[error("cannot retrieve schema document '{uri}'")]
    Unretrievable {
        /// Absolute URI of the document, fragment stripped.
        uri: String,
    },

    /// The JSON Pointer fragment does not address a value in the document.
    #[error("pointer '{pointer}' does not resolve in '{uri}'")]
    PointerNotFound {
        /// Absolute URI of the resource the pointer was evaluated against.
        uri: String,
        /// The unresolvable pointer.
        pointer: String,
    },

    /// The plain-name fragment is not declared by any `$id` or `$anchor`.
    #[error("anchor '{anchor}' is not declared in '{uri}'")]
    AnchorNotFound {
        /// Absolute URI of the resource that was searched.
        uri: String,
        /// The plain-name fragment.
        anchor: String,
    },

    /// A different document is already cached under this URI.
    #[error("a different schema document is already registered as '{uri}'")]
    Conflict {
        /// Absolute URI of the document, fragment stripped.
        uri: String,
    },

    /// The reference string is not a valid URI reference.
    #[error("invalid reference '{reference}' against base '{base}': {reason}")]
    InvalidReference {
        /// Base URI the reference was resolved against.
        base: String,
        /// The raw `$ref` / `$id` value.
        reference: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// A schema is structurally invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A (sub)schema is neither a boolean nor an object.
    #[error("schema at '{location}' must be a boolean or an object, found {found}")]
    InvalidSchema {
        /// Absolute schema location.
        location: String,
        /// JSON type name of the offending value.
        found: String,
    },

    /// A recognized keyword carries a value of the wrong shape.
    #[error("invalid '{keyword}' at '{location}': {reason}")]
    InvalidKeyword {
        /// Absolute schema location of the keyword.
        location: String,
        /// Keyword name.
        keyword: String,
        /// What was expected.
        reason: String,
    },

    /// Strict mode found a keyword outside the implemented surface.
    #[error("unknown keyword '{keyword}' at '{location}'")]
    UnknownKeyword {
        /// Absolute schema location of the keyword.
        location: String,
        /// Keyword name.
        keyword: String,
    },

    /// A `pattern` is not a valid regular expression.
    #[error("invalid regular expression '{pattern}' at '{location}': {reason}")]
    InvalidRegex {
        /// Absolute schema location of the keyword.
        location: String,
        /// The source pattern.
        pattern: String,
        /// Regex compiler diagnostic.
        reason: String,
    },
}
