//! # The `format` Keyword
//!
//! Built-in formats assert by default, host applications can register or
//! override checkers per validator, and format assertion can be turned
//! off entirely.

use jsv_schema::{FormatCheck, FormatChecker, ValidationErrorKind, Validator};
use serde_json::{json, Value};

fn format(name: &str) -> Validator {
    Validator::new(&json!({"format": name})).unwrap()
}

#[test]
fn test_builtin_formats_assert() {
    let cases = [
        ("date-time", json!("2024-01-15T09:30:00Z"), json!("2024-01-15")),
        ("date", json!("2024-01-15"), json!("2024-02-30")),
        ("time", json!("09:30:00+01:00"), json!("9:30")),
        ("duration", json!("P1Y2M"), json!("1Y")),
        ("email", json!("ops@example.com"), json!("ops@")),
        ("hostname", json!("api.example.com"), json!("api..example.com")),
        ("ipv4", json!("10.0.0.1"), json!("10.0.0")),
        ("ipv6", json!("fe80::1"), json!("fe80:::1")),
        ("uri", json!("urn:isbn:0451450523"), json!("no scheme")),
        ("uri-reference", json!("../up?q=1"), json!("has space")),
        ("uuid", json!("123e4567-e89b-12d3-a456-426614174000"), json!("123e4567")),
        ("json-pointer", json!("/a/0"), json!("a/0")),
        ("relative-json-pointer", json!("2/a"), json!("-1/a")),
        ("regex", json!("^\\d+$"), json!("(")),
        ("int32", json!(-5), json!(2147483648u64)),
        ("int64", json!(9007199254740993u64), json!(1.5)),
        ("persianString", json!("فارسی"), json!("farsi")),
        ("englishString", json!("plain text"), json!("متن")),
    ];
    for (name, good, bad) in cases {
        let v = format(name);
        assert!(v.is_valid(&good), "{name} should accept {good}");
        assert!(!v.is_valid(&bad), "{name} should reject {bad}");
    }
}

#[test]
fn test_range_detail_reaches_the_report() {
    let v = format("int32");
    let report = v.error_report(&json!(3_000_000_000u64));
    match &report.first().unwrap().kind {
        ValidationErrorKind::Format { format, detail } => {
            assert_eq!(format, "int32");
            assert_eq!(
                detail.as_deref(),
                Some("3000000000 is outside the int32 range [-2147483648, 2147483647]")
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_custom_format_overrides_builtin() {
    let v = jsv_schema::options()
        .with_format("email", |s: &str| s.ends_with("@example.com"))
        .with_format("iban-de", |s: &str| s.starts_with("DE") && s.len() == 22)
        .build(&json!({
            "properties": {
                "email": {"format": "email"},
                "iban": {"format": "iban-de"}
            }
        }))
        .unwrap();
    assert!(v.is_valid(&json!({"email": "a@example.com", "iban": "DE89370400440532013000"})));
    assert!(!v.is_valid(&json!({"email": "a@example.org"})));
    assert!(!v.is_valid(&json!({"iban": "FR7630006000011234567890189"})));
}

struct EvenNumber;

impl FormatChecker for EvenNumber {
    fn check(&self, instance: &Value) -> FormatCheck {
        match instance.as_i64() {
            Some(n) if n % 2 != 0 => FormatCheck::Invalid {
                detail: Some(format!("{n} is odd")),
            },
            _ => FormatCheck::Valid,
        }
    }
}

#[test]
fn test_custom_checker_with_detail() {
    let v = jsv_schema::options()
        .with_format_checker("even", EvenNumber)
        .build(&json!({"items": {"format": "even"}}))
        .unwrap();
    assert!(v.is_valid(&json!([2, 4, "x"])));
    let report = v.error_report(&json!([2, 3]));
    let entry = report.first().unwrap();
    assert_eq!(entry.instance_location.as_str(), "/1");
    assert_eq!(
        entry.kind,
        ValidationErrorKind::Format {
            format: "even".to_string(),
            detail: Some("3 is odd".to_string()),
        }
    );
}

#[test]
fn test_format_assertion_can_be_disabled() {
    let v = jsv_schema::options()
        .should_validate_formats(false)
        .build(&json!({"format": "ipv4"}))
        .unwrap();
    assert!(v.is_valid(&json!("not an address")));
}

#[test]
fn test_formats_ignore_other_types() {
    let v = format("date");
    assert!(v.is_valid(&json!(20240115)));
    assert!(format("int32").is_valid(&json!("2147483648")));
}
