//! Tests for the boolean converter

use super::*;
use crate::converter::BoolConverter;

#[test]
fn test_default_literals_ignore_case() {
    let converter = BoolConverter::new();

    assert_eq!(converter.try_convert("true"), Some(true));
    assert_eq!(converter.try_convert("TRUE"), Some(true));
    assert_eq!(converter.try_convert("False"), Some(false));
    assert_none_convert(&converter, &["", " ", "yes", "1"]);
}

#[test]
fn test_custom_literals() {
    let converter = BoolConverter::with_literals("Y", "N", true);

    assert_eq!(converter.try_convert("Y"), Some(true));
    assert_eq!(converter.try_convert("N"), Some(false));
    assert_none_convert(&converter, &["y", "n", "true"]);
}

#[test]
fn test_custom_literals_case_insensitive() {
    let converter = BoolConverter::with_literals("on", "off", false);

    assert_eq!(converter.try_convert("ON"), Some(true));
    assert_eq!(converter.try_convert("Off"), Some(false));
}
