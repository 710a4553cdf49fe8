//! Schema and instance locations.
//!
//! Schema locations are fixed at compile time and baked into each node.
//! Instance locations are only needed once something has failed, so they
//! are tracked as a borrowed chain on the stack and turned into a
//! [`JsonPointer`] during error construction.

use std::fmt;
use std::sync::Arc;

use jsv_core::JsonPointer;
use url::Url;

/// Where a compiled node lives: the document it came from and the JSON
/// Pointer of its keyword inside that document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocation {
    document: Arc<Url>,
    pointer: JsonPointer,
}

impl SchemaLocation {
    pub(crate) fn new(document: Arc<Url>, pointer: JsonPointer) -> Self {
        Self { document, pointer }
    }

    /// Pointer of the keyword inside its document.
    pub fn pointer(&self) -> &JsonPointer {
        &self.pointer
    }

    /// URI of the document (no fragment).
    pub fn document(&self) -> &Url {
        &self.document
    }

    /// `document#pointer`, with the pointer percent-encoded as a URI
    /// fragment.
    pub fn absolute(&self) -> String {
        absolute_uri(&self.document, &self.pointer)
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute())
    }
}

/// `document` with `pointer` as its fragment.
pub(crate) fn absolute_uri(document: &Url, pointer: &JsonPointer) -> String {
    let mut uri = document.clone();
    uri.set_fragment(Some(pointer.as_str()));
    uri.into()
}

#[derive(Debug, Clone, Copy)]
enum PathChunk<'a> {
    Key(&'a str),
    Index(usize),
}

/// A location in the instance, as a linked list of borrowed chunks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InstancePath<'a> {
    chunk: Option<PathChunk<'a>>,
    parent: Option<&'a InstancePath<'a>>,
}

impl<'a> InstancePath<'a> {
    pub(crate) const fn root() -> Self {
        Self {
            chunk: None,
            parent: None,
        }
    }

    pub(crate) fn push_key(&'a self, key: &'a str) -> Self {
        Self {
            chunk: Some(PathChunk::Key(key)),
            parent: Some(self),
        }
    }

    pub(crate) fn push_index(&'a self, index: usize) -> Self {
        Self {
            chunk: Some(PathChunk::Index(index)),
            parent: Some(self),
        }
    }

    pub(crate) fn to_pointer(&self) -> JsonPointer {
        let mut chunks = Vec::new();
        let mut current = Some(self);
        while let Some(path) = current {
            if let Some(chunk) = path.chunk {
                chunks.push(chunk);
            }
            current = path.parent;
        }
        chunks
            .into_iter()
            .rev()
            .fold(JsonPointer::root(), |pointer, chunk| match chunk {
                PathChunk::Key(key) => pointer.push_key(key),
                PathChunk::Index(index) => pointer.push_index(index),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_path_to_pointer() {
        let root = InstancePath::root();
        let a = root.push_key("items");
        let b = a.push_index(2);
        let c = b.push_key("a/b");
        assert_eq!(c.to_pointer().as_str(), "/items/2/a~1b");
        assert!(root.to_pointer().is_root());
    }

    #[test]
    fn test_schema_location_absolute() {
        let doc = Arc::new(Url::parse("https://example.com/s.json").unwrap());
        let loc = SchemaLocation::new(doc, JsonPointer::parse("/$defs/pos/minimum").unwrap());
        assert_eq!(loc.absolute(), "https://example.com/s.json#/$defs/pos/minimum");
        assert_eq!(loc.to_string(), loc.absolute());
    }

    #[test]
    fn test_absolute_location_is_a_valid_uri() {
        let doc = Arc::new(Url::parse("https://example.com/s.json").unwrap());
        let loc = SchemaLocation::new(Arc::clone(&doc), JsonPointer::root().push_key("a b").push_key("<x>"));
        assert_eq!(loc.absolute(), "https://example.com/s.json#/a%20b/%3Cx%3E");
        assert!(Url::parse(&loc.absolute()).is_ok());
        let root = SchemaLocation::new(doc, JsonPointer::root());
        assert_eq!(root.absolute(), "https://example.com/s.json#");
    }
}
