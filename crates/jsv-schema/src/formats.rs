//! # Format Checkers
//!
//! The `format` keyword names a [`FormatChecker`]. Checkers are stateless
//! predicates over a single value; a failure may carry a detail string
//! (for example the range an `int32` value fell outside of) which is
//! returned as part of the [`FormatCheck`] rather than stored anywhere.
//!
//! Built-in checkers live in a static map built on first use. Host
//! applications register extra checkers per validator through
//! [`ValidationOptions::with_format`](crate::ValidationOptions::with_format);
//! those shadow built-ins of the same name.
//!
//! String formats accept every non-string instance. Numeric formats accept
//! every non-number instance.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDate};
use jsv_core::JsonPointer;
use regex::Regex;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

/// Outcome of a format check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCheck {
    /// The value conforms, or the checker does not apply to its type.
    Valid,
    /// The value does not conform.
    Invalid {
        /// Optional explanation, carried into the error kind.
        detail: Option<String>,
    },
}

impl FormatCheck {
    /// Returns true for [`FormatCheck::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    fn from_bool(valid: bool) -> Self {
        if valid {
            Self::Valid
        } else {
            Self::Invalid { detail: None }
        }
    }
}

/// A named predicate for the `format` keyword.
pub trait FormatChecker: Send + Sync {
    /// Check `instance`.
    fn check(&self, instance: &Value) -> FormatCheck;
}

/// Adapts a string predicate into a [`FormatChecker`] that passes
/// non-string values.
#[derive(Clone, Copy)]
pub struct StringFormat<F>(F);

impl<F> StringFormat<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    /// Wrap `predicate`.
    pub fn new(predicate: F) -> Self {
        Self(predicate)
    }
}

impl<F> FormatChecker for StringFormat<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, instance: &Value) -> FormatCheck {
        match instance {
            Value::String(s) => FormatCheck::from_bool((self.0)(s)),
            _ => FormatCheck::Valid,
        }
    }
}

/// Whole-number range check shared by `int32` and `int64`.
///
/// Accepts every numeric representation. A floating value must have a
/// zero fractional part.
#[derive(Debug, Clone, Copy)]
pub struct IntegerRange {
    name: &'static str,
    min: i64,
    max: i64,
}

impl IntegerRange {
    /// Signed 32-bit range.
    pub const INT32: Self = Self {
        name: "int32",
        min: i32::MIN as i64,
        max: i32::MAX as i64,
    };

    /// Signed 64-bit range.
    pub const INT64: Self = Self {
        name: "int64",
        min: i64::MIN,
        max: i64::MAX,
    };

    fn out_of_range(&self, value: impl std::fmt::Display) -> FormatCheck {
        FormatCheck::Invalid {
            detail: Some(format!(
                "{value} is outside the {} range [{}, {}]",
                self.name, self.min, self.max
            )),
        }
    }
}

impl FormatChecker for IntegerRange {
    fn check(&self, instance: &Value) -> FormatCheck {
        let Value::Number(n) = instance else {
            return FormatCheck::Valid;
        };
        let whole = if let Some(i) = n.as_i64() {
            Some(i128::from(i))
        } else {
            n.as_u64().map(i128::from)
        };
        if let Some(v) = whole {
            return if v >= i128::from(self.min) && v <= i128::from(self.max) {
                FormatCheck::Valid
            } else {
                self.out_of_range(v)
            };
        }
        let Some(f) = n.as_f64() else {
            return FormatCheck::Invalid { detail: None };
        };
        if !f.is_finite() || f % 1.0 != 0.0 {
            return FormatCheck::Invalid {
                detail: Some(format!("{f} is not a whole number")),
            };
        }
        if f >= self.min as f64 && f < self.max as f64 + 1.0 {
            FormatCheck::Valid
        } else {
            self.out_of_range(f)
        }
    }
}

/// Full-match character-class check; the empty string is always valid.
struct CharacterClass {
    regex: fn() -> Option<&'static Regex>,
}

impl FormatChecker for CharacterClass {
    fn check(&self, instance: &Value) -> FormatCheck {
        match instance {
            Value::String(s) if s.is_empty() => FormatCheck::Valid,
            Value::String(s) => FormatCheck::from_bool((self.regex)().is_some_and(|re| re.is_match(s))),
            _ => FormatCheck::Valid,
        }
    }
}

type FormatMap = HashMap<&'static str, Arc<dyn FormatChecker>>;

fn builtins() -> &'static FormatMap {
    static BUILTINS: OnceLock<FormatMap> = OnceLock::new();
    BUILTINS.get_or_init(|| {
        let mut map: FormatMap = HashMap::new();
        map.insert("date-time", Arc::new(StringFormat::new(is_date_time)));
        map.insert("date", Arc::new(StringFormat::new(is_date)));
        map.insert("time", Arc::new(StringFormat::new(is_time)));
        map.insert("duration", Arc::new(StringFormat::new(is_duration)));
        map.insert("email", Arc::new(StringFormat::new(is_email)));
        map.insert("hostname", Arc::new(StringFormat::new(is_hostname)));
        map.insert("ipv4", Arc::new(StringFormat::new(is_ipv4)));
        map.insert("ipv6", Arc::new(StringFormat::new(is_ipv6)));
        map.insert("uri", Arc::new(StringFormat::new(is_uri)));
        map.insert("uri-reference", Arc::new(StringFormat::new(is_uri_reference)));
        map.insert("uuid", Arc::new(StringFormat::new(is_uuid)));
        map.insert("json-pointer", Arc::new(StringFormat::new(is_json_pointer)));
        map.insert(
            "relative-json-pointer",
            Arc::new(StringFormat::new(is_relative_json_pointer)),
        );
        map.insert("regex", Arc::new(StringFormat::new(is_regex)));
        map.insert("int32", Arc::new(IntegerRange::INT32));
        map.insert("int64", Arc::new(IntegerRange::INT64));
        map.insert("persianString", Arc::new(CharacterClass { regex: persian_regex }));
        map.insert("englishString", Arc::new(CharacterClass { regex: english_regex }));
        map
    })
}

/// Look up a built-in checker by format name.
pub fn builtin(name: &str) -> Option<Arc<dyn FormatChecker>> {
    builtins().get(name).cloned()
}

/// Names of all built-in formats, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = builtins().keys().copied().collect();
    names.sort_unstable();
    names
}

fn persian_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\x{0600}-\x{06FF}\x{200C}\x{200F}\s0-9[:punct:]]*$").ok())
        .as_ref()
}

fn english_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\x20-\x7E\s]*$").ok()).as_ref()
}

fn duration_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^P(?:\d+W|(?:\d+Y)?(?:\d+M)?(?:\d+D)?(?:T(?:\d+H)?(?:\d+M)?(?:\d+S)?)?)$").ok()
    })
    .as_ref()
}

fn is_date_time(s: &str) -> bool {
    matches!(s.as_bytes().get(10), Some(b'T' | b't')) && DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
        && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn is_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}")).is_ok()
}

fn is_duration(s: &str) -> bool {
    s != "P" && !s.ends_with('T') && duration_regex().is_some_and(|re| re.is_match(s))
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    is_email_local(local) && is_email_domain(domain)
}

fn is_email_local(local: &str) -> bool {
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if let Some(inner) = local.strip_prefix('"').and_then(|l| l.strip_suffix('"')) {
        let mut escaped = false;
        for c in inner.chars() {
            match (escaped, c) {
                (true, _) => escaped = false,
                (false, '\\') => escaped = true,
                (false, '"') => return false,
                (false, c) if c.is_ascii_control() => return false,
                _ => {}
            }
        }
        return !escaped;
    }
    const SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";
    local
        .split('.')
        .all(|atom| !atom.is_empty() && atom.chars().all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c)))
}

fn is_email_domain(domain: &str) -> bool {
    if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        return match literal.strip_prefix("IPv6:") {
            Some(v6) => is_ipv6(v6),
            None => is_ipv4(literal),
        };
    }
    is_hostname(domain)
}

fn is_hostname(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 253
        && s.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn is_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

fn is_ipv6(s: &str) -> bool {
    s.parse::<Ipv6Addr>().is_ok()
}

fn is_uri(s: &str) -> bool {
    !s.chars().any(|c| c.is_whitespace() || c.is_control()) && Url::parse(s).is_ok()
}

fn is_uri_reference(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace() || c.is_control() || c == '\\') {
        return false;
    }
    if Url::parse(s).is_ok() {
        return true;
    }
    Url::parse(crate::registry::DEFAULT_BASE_URI)
        .and_then(|base| base.join(s))
        .is_ok()
}

fn is_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::parse_str(s).is_ok()
}

fn is_json_pointer(s: &str) -> bool {
    JsonPointer::parse(s).is_ok()
}

fn is_relative_json_pointer(s: &str) -> bool {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && s.starts_with('0')) {
        return false;
    }
    let rest = &s[digits..];
    rest.is_empty() || rest == "#" || (rest.starts_with('/') && is_json_pointer(rest))
}

fn is_regex(s: &str) -> bool {
    Regex::new(s).is_ok()
}
