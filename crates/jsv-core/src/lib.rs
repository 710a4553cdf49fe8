//! # jsv-core — Foundational Types for the jsv Schema Engine
//!
//! This crate is the leaf of the workspace. It defines the primitives the
//! schema engine builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **The value model is `serde_json::Value`.** The engine never parses
//!    JSON text; it consumes trees produced by the caller. Key order is
//!    preserved (`preserve_order`), so keyword declaration order is
//!    observable in compile and error order.
//!
//! 2. **One pointer type.** [`JsonPointer`] is used for schema locations,
//!    instance locations and `$ref` fragments alike.
//!
//! 3. **Exact numeric semantics.** [`is_integer`] accepts `2.0` and
//!    rejects `2.5` with no epsilon; [`json_equal`] compares numbers by
//!    value so `1` and `1.0` are the same `enum` member.
//!
//! 4. **Compile errors are fatal, validation failures are not.**
//!    [`CompileError`] covers dangling references and malformed keywords.
//!    There is no error type for "instance does not conform".
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod pointer;
pub mod value;
pub mod yaml;

// Re-export primary types for ergonomic imports.
pub use error::{CompileError, JsvError, ResolutionError, SchemaError};
pub use pointer::{InvalidPointer, JsonPointer};
pub use value::{compare_numbers, is_integer, is_multiple_of, json_equal, PrimitiveType, UnknownType};
pub use yaml::{yaml_str_to_json_value, yaml_to_json_value};
