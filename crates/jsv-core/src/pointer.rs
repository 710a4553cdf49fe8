//! # JSON Pointer (RFC 6901)
//!
//! `JsonPointer` addresses a location inside a JSON value by a sequence of
//! object keys and array indices. It is used for three things across the
//! engine: the schema location baked into every compiled node, the
//! instance location of an error entry, and `$ref` fragments.
//!
//! The pointer is stored in its escaped string form (`~0` for `~`, `~1`
//! for `/`), which is also what `Display` and `Serialize` produce.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// A string that is not a syntactically valid JSON Pointer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid JSON pointer '{0}'")]
pub struct InvalidPointer(pub String);

/// An owned, escaped RFC 6901 JSON Pointer.
///
/// The empty pointer addresses the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The pointer addressing the document root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse an escaped pointer string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPointer`] if the string is non-empty and does not
    /// start with `/`, or if a `~` is not followed by `0` or `1`.
    pub fn parse(s: &str) -> Result<Self, InvalidPointer> {
        if !s.is_empty() && !s.starts_with('/') {
            return Err(InvalidPointer(s.to_string()));
        }
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '~' && !matches!(chars.next(), Some('0') | Some('1')) {
                return Err(InvalidPointer(s.to_string()));
            }
        }
        Ok(Self(s.to_string()))
    }

    /// Returns a child pointer descending into object key `key`.
    pub fn push_key(&self, key: &str) -> Self {
        let mut out = String::with_capacity(self.0.len() + key.len() + 1);
        out.push_str(&self.0);
        out.push('/');
        for c in key.chars() {
            match c {
                '~' => out.push_str("~0"),
                '/' => out.push_str("~1"),
                other => out.push(other),
            }
        }
        Self(out)
    }

    /// Returns a child pointer descending into array index `index`.
    pub fn push_index(&self, index: usize) -> Self {
        Self(format!("{}/{index}", self.0))
    }

    /// Concatenate `other` below `self`.
    pub fn join(&self, other: &JsonPointer) -> Self {
        Self(format!("{}{}", self.0, other.0))
    }

    /// The part of `self` below `prefix`, or `None` if `prefix` is not
    /// an ancestor of (or equal to) `self`.
    pub fn strip_prefix(&self, prefix: &JsonPointer) -> Option<Self> {
        let rest = self.0.strip_prefix(prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(Self(rest.to_string()))
        } else {
            None
        }
    }

    /// The escaped string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty (whole-document) pointer.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the unescaped reference tokens.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.0
            .split('/')
            .skip(1)
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
    }

    /// Evaluate the pointer against `value`.
    ///
    /// Returns `None` if any token addresses a missing key, an
    /// out-of-range or malformed array index, or descends into a scalar.
    pub fn evaluate<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let mut current = value;
        for token in self.tokens() {
            current = match current {
                Value::Object(map) => map.get(&token)?,
                Value::Array(items) => items.get(parse_index(&token)?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Array indices are decimal without leading zeros (`0` itself is fine).
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty()
        || (token.len() > 1 && token.starts_with('0'))
        || !token.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    token.parse().ok()
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl std::str::FromStr for JsonPointer {
    type Err = InvalidPointer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_pointer_is_empty() {
        let p = JsonPointer::root();
        assert!(p.is_root());
        assert_eq!(p.to_string(), "");
    }

    #[test]
    fn test_push_escapes_special_characters() {
        let p = JsonPointer::root().push_key("a/b").push_key("m~n").push_index(3);
        assert_eq!(p.as_str(), "/a~1b/m~0n/3");
        let tokens: Vec<String> = p.tokens().collect();
        assert_eq!(tokens, vec!["a/b", "m~n", "3"]);
    }

    #[test]
    fn test_evaluate_rfc6901_examples() {
        let doc = json!({
            "foo": ["bar", "baz"],
            "": 0,
            "a/b": 1,
            "m~n": 8
        });
        let eval = |s: &str| JsonPointer::parse(s).unwrap().evaluate(&doc).cloned();
        assert_eq!(eval(""), Some(doc.clone()));
        assert_eq!(eval("/foo/0"), Some(json!("bar")));
        assert_eq!(eval("/"), Some(json!(0)));
        assert_eq!(eval("/a~1b"), Some(json!(1)));
        assert_eq!(eval("/m~0n"), Some(json!(8)));
    }

    #[test]
    fn test_evaluate_missing_path_is_none() {
        let doc = json!({"foo": ["bar"]});
        for s in ["/nope", "/foo/1", "/foo/01", "/foo/-", "/foo/0/deeper"] {
            let p = JsonPointer::parse(s).unwrap();
            assert_eq!(p.evaluate(&doc), None, "pointer {s} should not resolve");
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(JsonPointer::parse("foo").is_err());
        assert!(JsonPointer::parse("/a~2").is_err());
        assert!(JsonPointer::parse("/a~").is_err());
        assert!(JsonPointer::parse("/a~0~1").is_ok());
    }

    #[test]
    fn test_join_and_serialize() {
        let a = JsonPointer::parse("/properties/x").unwrap();
        let b = JsonPointer::parse("/minimum").unwrap();
        let joined = a.join(&b);
        assert_eq!(joined.as_str(), "/properties/x/minimum");
        assert_eq!(serde_json::to_value(&joined).unwrap(), json!("/properties/x/minimum"));
    }

    #[test]
    fn test_strip_prefix_respects_token_boundaries() {
        let p = JsonPointer::parse("/$defs/pos/minimum").unwrap();
        let defs = JsonPointer::parse("/$defs/pos").unwrap();
        assert_eq!(p.strip_prefix(&defs).unwrap().as_str(), "/minimum");
        assert_eq!(p.strip_prefix(&JsonPointer::root()), Some(p.clone()));
        assert!(p.strip_prefix(&p).unwrap().is_root());
        assert_eq!(p.strip_prefix(&JsonPointer::parse("/$defs/po").unwrap()), None);
    }
}
