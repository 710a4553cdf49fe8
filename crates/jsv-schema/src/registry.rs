//! # Document Cache and Reference Resolver
//!
//! [`Registry`] owns every schema document a validator was compiled from.
//! Documents are loaded through an injected [`Retrieve`] collaborator at
//! most once per absolute URI (fragment stripped), even when several
//! threads ask for the same URI at the same time: each URI gets its own
//! slot lock, so a slow retrieval only blocks callers waiting on that URI.
//!
//! On first load a document is indexed:
//!
//! - every object carrying a string `$id` is registered as a resource
//!   under its resolved absolute URI,
//! - `$id: "#name"`, `$id: "uri#name"` and `$anchor: "name"` register
//!   plain-name anchors within their resource.
//!
//! [`Registry::resolve_ref`] follows a `$ref` from a base URI to the
//! target value, whether it lives in the same document, in a nested
//! `$id` resource, or in a document that still has to be retrieved.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsv_core::{JsonPointer, ResolutionError};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use url::Url;

/// Base URI for documents that neither declare an `$id` nor were given
/// one by the caller.
pub const DEFAULT_BASE_URI: &str = "json-schema:///";

/// Keywords whose values are data, not subschemas. `$id`s inside them are
/// not resources.
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Retrieval collaborator: fetches and parses the document at `uri`.
///
/// Returning `None` means the document cannot be resolved; the compiler
/// turns that into [`ResolutionError::Unretrievable`]. Calls are
/// synchronous and may block. Timeouts are the implementor's concern.
pub trait Retrieve: Send + Sync {
    /// Fetch the document identified by `uri` (no fragment).
    fn retrieve(&self, uri: &Url) -> Option<Value>;
}

impl<F> Retrieve for F
where
    F: Fn(&Url) -> Option<Value> + Send + Sync,
{
    fn retrieve(&self, uri: &Url) -> Option<Value> {
        self(uri)
    }
}

/// A retriever that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetrieve;

impl Retrieve for NoRetrieve {
    fn retrieve(&self, _uri: &Url) -> Option<Value> {
        None
    }
}

/// In-memory URI → document map.
#[derive(Debug, Clone, Default)]
pub struct MemoryRetriever {
    documents: HashMap<Url, Value>,
}

impl MemoryRetriever {
    /// Create an empty retriever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, builder style.
    pub fn with_document(mut self, uri: Url, document: Value) -> Self {
        self.insert(uri, document);
        self
    }

    /// Add a document. The fragment of `uri` is ignored.
    pub fn insert(&mut self, uri: Url, document: Value) {
        self.documents.insert(strip_fragment(&uri), document);
    }
}

impl Retrieve for MemoryRetriever {
    fn retrieve(&self, uri: &Url) -> Option<Value> {
        self.documents.get(uri).cloned()
    }
}

/// An immutable schema document and the URI it is cached under.
#[derive(Debug, PartialEq)]
pub struct SchemaDocument {
    uri: Url,
    base: Url,
    contents: Value,
}

impl SchemaDocument {
    /// The cache key (absolute, no fragment).
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The parsed document.
    pub fn contents(&self) -> &Value {
        &self.contents
    }
}

/// Where an indexed resource or anchor lives.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResourceLocation {
    document: Url,
    pointer: JsonPointer,
}

/// The target of a resolved `$ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRef {
    document: Url,
    pointer: JsonPointer,
    base: Url,
    contents: Value,
}

impl ResolvedRef {
    /// URI of the document containing the target.
    pub fn document(&self) -> &Url {
        &self.document
    }

    /// Pointer of the target inside its document.
    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }

    /// Base URI in effect at the target, before the target's own `$id`.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The target schema value.
    pub fn contents(&self) -> &Value {
        &self.contents
    }
}

type DocumentSlot = Arc<Mutex<Option<Arc<SchemaDocument>>>>;

/// Thread-safe document cache and `$id` index.
pub struct Registry {
    retriever: Arc<dyn Retrieve>,
    documents: Mutex<HashMap<Url, DocumentSlot>>,
    resources: RwLock<HashMap<Url, ResourceLocation>>,
    anchors: RwLock<HashMap<(Url, String), ResourceLocation>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("documents", &self.document_count())
            .field("resources", &self.resources.read().len())
            .field("anchors", &self.anchors.read().len())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// A registry that can only serve documents inserted up front.
    pub fn new() -> Self {
        Self::with_retriever(NoRetrieve)
    }

    /// A registry that loads unknown documents through `retriever`.
    pub fn with_retriever(retriever: impl Retrieve + 'static) -> Self {
        Self::from_shared_retriever(Arc::new(retriever))
    }

    pub(crate) fn from_shared_retriever(retriever: Arc<dyn Retrieve>) -> Self {
        Self {
            retriever,
            documents: Mutex::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
            anchors: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached documents.
    pub fn document_count(&self) -> usize {
        self.documents
            .lock()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    /// The cached document for `uri`, without retrieving it.
    pub fn get(&self, uri: &Url) -> Option<Arc<SchemaDocument>> {
        let slot = self.documents.lock().get(&strip_fragment(uri)).cloned()?;
        let cached = slot.lock().clone();
        cached
    }

    fn slot(&self, key: &Url) -> DocumentSlot {
        self.documents.lock().entry(key.clone()).or_default().clone()
    }

    /// Load the document at `uri`, retrieving it on first access.
    ///
    /// Repeated loads return the same `Arc`. A failed retrieval is not
    /// cached.
    pub fn load(&self, uri: &Url) -> Result<Arc<SchemaDocument>, ResolutionError> {
        let key = strip_fragment(uri);
        let slot = self.slot(&key);
        let mut cached = slot.lock();
        if let Some(document) = cached.as_ref() {
            tracing::trace!(uri = %key, "schema document cache hit");
            return Ok(Arc::clone(document));
        }
        tracing::debug!(uri = %key, "retrieving schema document");
        let contents = self
            .retriever
            .retrieve(&key)
            .ok_or_else(|| ResolutionError::Unretrievable {
                uri: key.to_string(),
            })?;
        let document = Arc::new(SchemaDocument {
            base: key.clone(),
            uri: key,
            contents,
        });
        self.index(&document)?;
        *cached = Some(Arc::clone(&document));
        Ok(document)
    }

    /// Register an already-parsed document under `uri`.
    ///
    /// If a document is already cached under that URI the first one is
    /// kept and returned.
    pub fn insert(&self, uri: &Url, contents: Value) -> Result<Arc<SchemaDocument>, ResolutionError> {
        self.insert_with_base(uri, uri, contents)
    }

    /// Register a root document whose URI was derived from its own `$id`.
    /// `base` is the URI in effect before that `$id`; the root `$id` is
    /// resolved against it, not against `uri`.
    pub(crate) fn insert_with_base(
        &self,
        uri: &Url,
        base: &Url,
        contents: Value,
    ) -> Result<Arc<SchemaDocument>, ResolutionError> {
        let key = strip_fragment(uri);
        let slot = self.slot(&key);
        let mut cached = slot.lock();
        if let Some(document) = cached.as_ref() {
            tracing::debug!(uri = %key, "schema document already registered, keeping the first");
            return Ok(Arc::clone(document));
        }
        let document = Arc::new(SchemaDocument {
            uri: key,
            base: strip_fragment(base),
            contents,
        });
        self.index(&document)?;
        *cached = Some(Arc::clone(&document));
        Ok(document)
    }

    fn index(&self, document: &SchemaDocument) -> Result<(), ResolutionError> {
        let mut resources = vec![(
            document.uri.clone(),
            ResourceLocation {
                document: document.uri.clone(),
                pointer: JsonPointer::root(),
            },
        )];
        let mut anchors = Vec::new();
        collect_ids(
            &document.contents,
            &document.base,
            &document.uri,
            &JsonPointer::root(),
            &mut resources,
            &mut anchors,
        )?;
        tracing::debug!(
            uri = %document.uri,
            resources = resources.len(),
            anchors = anchors.len(),
            "indexed schema document"
        );
        {
            let mut index = self.resources.write();
            for (uri, location) in resources {
                index.entry(uri).or_insert(location);
            }
        }
        let mut index = self.anchors.write();
        for (key, location) in anchors {
            index.entry(key).or_insert(location);
        }
        Ok(())
    }

    fn resource(&self, uri: &Url) -> Result<ResourceLocation, ResolutionError> {
        let known = self.resources.read().get(uri).cloned();
        if let Some(location) = known {
            return Ok(location);
        }
        self.load(uri)?;
        let loaded = self.resources.read().get(uri).cloned();
        Ok(loaded.unwrap_or_else(|| ResourceLocation {
            document: uri.clone(),
            pointer: JsonPointer::root(),
        }))
    }

    /// Resolve `reference` against `base` to the value it addresses.
    pub fn resolve_ref(&self, base: &Url, reference: &str) -> Result<ResolvedRef, ResolutionError> {
        let invalid = |reason: String| ResolutionError::InvalidReference {
            base: base.to_string(),
            reference: reference.to_string(),
            reason,
        };
        let target = base.join(reference).map_err(|e| invalid(e.to_string()))?;
        let fragment = target.fragment().unwrap_or("").to_string();
        let resource_uri = strip_fragment(&target);
        let resource = self.resource(&resource_uri)?;

        let location = if fragment.is_empty() {
            resource
        } else if fragment.starts_with('/') {
            let decoded = percent_decode(&fragment).ok_or_else(|| invalid("fragment is not valid UTF-8".to_string()))?;
            let pointer = JsonPointer::parse(&decoded).map_err(|e| invalid(e.to_string()))?;
            ResourceLocation {
                document: resource.document,
                pointer: resource.pointer.join(&pointer),
            }
        } else {
            let anchor = self.anchors.read().get(&(resource_uri.clone(), fragment.clone())).cloned();
            anchor.ok_or_else(|| ResolutionError::AnchorNotFound {
                uri: resource_uri.to_string(),
                anchor: fragment.clone(),
            })?
        };

        let document = self.load(&location.document)?;
        let contents = location
            .pointer
            .evaluate(&document.contents)
            .ok_or_else(|| ResolutionError::PointerNotFound {
                uri: location.document.to_string(),
                pointer: location.pointer.to_string(),
            })?
            .clone();
        let base = base_at(&document, &location.pointer)?;
        tracing::trace!(
            reference,
            document = %location.document,
            pointer = %location.pointer,
            "resolved reference"
        );
        Ok(ResolvedRef {
            document: location.document,
            pointer: location.pointer,
            base,
            contents,
        })
    }
}

/// Effective base URI at `pointer`, applying every `$id` on the way down
/// but not the one at `pointer` itself.
fn base_at(document: &SchemaDocument, pointer: &JsonPointer) -> Result<Url, ResolutionError> {
    let mut base = document.base.clone();
    let mut current = &document.contents;
    for token in pointer.tokens() {
        if let Some(Value::String(id)) = current.get("$id") {
            base = join_id(&base, id)?;
        }
        current = match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| ResolutionError::PointerNotFound {
            uri: document.uri.to_string(),
            pointer: pointer.to_string(),
        })?;
    }
    Ok(base)
}

fn join_id(base: &Url, id: &str) -> Result<Url, ResolutionError> {
    base.join(id)
        .map(|uri| strip_fragment(&uri))
        .map_err(|e| ResolutionError::InvalidReference {
            base: base.to_string(),
            reference: id.to_string(),
            reason: e.to_string(),
        })
}

fn collect_ids(
    value: &Value,
    base: &Url,
    document: &Url,
    pointer: &JsonPointer,
    resources: &mut Vec<(Url, ResourceLocation)>,
    anchors: &mut Vec<((Url, String), ResourceLocation)>,
) -> Result<(), ResolutionError> {
    match value {
        Value::Object(map) => {
            let here = || ResourceLocation {
                document: document.clone(),
                pointer: pointer.clone(),
            };
            let mut base = base.clone();
            if let Some(Value::String(id)) = map.get("$id") {
                let joined = base.join(id).map_err(|e| ResolutionError::InvalidReference {
                    base: base.to_string(),
                    reference: id.clone(),
                    reason: e.to_string(),
                })?;
                let name = joined.fragment().unwrap_or("").to_string();
                if !id.starts_with('#') {
                    base = strip_fragment(&joined);
                    resources.push((base.clone(), here()));
                }
                if !name.is_empty() && !name.starts_with('/') {
                    anchors.push(((base.clone(), name), here()));
                }
            }
            if let Some(Value::String(anchor)) = map.get("$anchor") {
                anchors.push(((base.clone(), anchor.clone()), here()));
            }
            for (key, child) in map {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                collect_ids(child, &base, document, &pointer.push_key(key), resources, anchors)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_ids(child, base, document, &pointer.push_index(i), resources, anchors)?;
            }
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn strip_fragment(uri: &Url) -> Url {
    let mut uri = uri.clone();
    uri.set_fragment(None);
    uri
}

/// Decode `%XX` escapes. Returns `None` if the result is not UTF-8.
fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}
