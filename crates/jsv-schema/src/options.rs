//! # Validator Configuration
//!
//! [`ValidationOptions`] is the only configuration surface of the engine.
//! Nothing is read from the environment or from files.
//!
//! ```
//! use serde_json::json;
//!
//! let validator = jsv_schema::options()
//!     .with_format("even-length", |s: &str| s.len() % 2 == 0)
//!     .strict(true)
//!     .build(&json!({"type": "string", "format": "even-length"}))
//!     .expect("valid schema");
//!
//! assert!(validator.is_valid(&json!("ab")));
//! assert!(!validator.is_valid(&json!("abc")));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsv_core::{CompileError, ResolutionError};
use serde_json::Value;
use url::Url;

use crate::compiler::Compiler;
use crate::formats::{FormatChecker, StringFormat};
use crate::registry::{strip_fragment, Registry, Retrieve, DEFAULT_BASE_URI};
use crate::validator::Validator;

/// Builder for [`Validator`]s.
#[derive(Clone)]
pub struct ValidationOptions {
    base_uri: Option<Url>,
    retriever: Option<Arc<dyn Retrieve>>,
    registry: Option<Arc<Registry>>,
    documents: Vec<(Url, Value)>,
    pub(crate) formats: HashMap<String, Arc<dyn FormatChecker>>,
    pub(crate) validate_formats: bool,
    pub(crate) strict: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            base_uri: None,
            retriever: None,
            registry: None,
            documents: Vec::new(),
            formats: HashMap::new(),
            validate_formats: true,
            strict: false,
        }
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<&String> = self.formats.keys().collect();
        formats.sort();
        f.debug_struct("ValidationOptions")
            .field("base_uri", &self.base_uri)
            .field("has_retriever", &self.retriever.is_some())
            .field("registry", &self.registry)
            .field("documents", &self.documents.len())
            .field("formats", &formats)
            .field("validate_formats", &self.validate_formats)
            .field("strict", &self.strict)
            .finish()
    }
}

impl ValidationOptions {
    /// Base URI for a root schema without an absolute `$id`.
    /// Defaults to `json-schema:///`.
    pub fn with_base_uri(mut self, base_uri: Url) -> Self {
        self.base_uri = Some(strip_fragment(&base_uri));
        self
    }

    /// Retrieval collaborator for documents referenced but not preloaded.
    /// Ignored when a shared registry is supplied.
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Some(Arc::new(retriever));
        self
    }

    /// Share a document cache across validators. The registry's own
    /// retriever is used.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Preload a document so references to `uri` need no retrieval.
    pub fn with_document(mut self, uri: Url, document: Value) -> Self {
        self.documents.push((uri, document));
        self
    }

    /// Register a string format. Overrides a built-in of the same name.
    pub fn with_format<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.with_format_checker(name, StringFormat::new(predicate))
    }

    /// Register an arbitrary format checker. Overrides a built-in of the
    /// same name.
    pub fn with_format_checker(mut self, name: impl Into<String>, checker: impl FormatChecker + 'static) -> Self {
        self.formats.insert(name.into(), Arc::new(checker));
        self
    }

    /// Whether `format` is asserted (default `true`). When off, every
    /// `format` keyword accepts everything.
    pub fn should_validate_formats(mut self, yes: bool) -> Self {
        self.validate_formats = yes;
        self
    }

    /// Reject keywords outside the supported vocabulary (default `false`).
    pub fn strict(mut self, yes: bool) -> Self {
        self.strict = yes;
        self
    }

    /// Compile `schema` into a [`Validator`].
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Resolution`] if a `$ref` cannot be resolved
    /// or a preloaded document conflicts with the root, and
    /// [`CompileError::Schema`] if a keyword is malformed.
    pub fn build(&self, schema: &Value) -> Result<Validator, CompileError> {
        let registry = match &self.registry {
            Some(registry) => Arc::clone(registry),
            None => Arc::new(match &self.retriever {
                Some(retriever) => Registry::from_shared_retriever(Arc::clone(retriever)),
                None => Registry::new(),
            }),
        };
        for (uri, document) in &self.documents {
            registry.insert(uri, document.clone())?;
        }

        let base = match &self.base_uri {
            Some(base) => base.clone(),
            None => Url::parse(DEFAULT_BASE_URI).map_err(|e| ResolutionError::InvalidReference {
                base: DEFAULT_BASE_URI.to_string(),
                reference: String::new(),
                reason: e.to_string(),
            })?,
        };
        let document_uri = match schema.get("$id") {
            Some(Value::String(id)) => base
                .join(id)
                .map(|uri| strip_fragment(&uri))
                .map_err(|e| ResolutionError::InvalidReference {
                    base: base.to_string(),
                    reference: id.clone(),
                    reason: e.to_string(),
                })?,
            _ => base.clone(),
        };

        let root = registry.insert_with_base(&document_uri, &base, schema.clone())?;
        if root.contents() != schema {
            return Err(ResolutionError::Conflict {
                uri: document_uri.to_string(),
            }
            .into());
        }

        let nodes = Compiler::new(&registry, self).compile_document(&document_uri, base, schema)?;
        tracing::debug!(
            uri = %document_uri,
            nodes = nodes.len(),
            documents = registry.document_count(),
            "built validator"
        );
        Ok(Validator::from_parts(nodes, registry, Arc::new(document_uri)))
    }
}
