//! Tests for nullable composition and default converters

use super::*;
use crate::converter::{DefaultConverter, Int32Converter, Nullable};
use chrono::NaiveDate;

#[test]
fn test_blank_and_absent_are_null() {
    let converter = Nullable::new(Int32Converter::new());

    assert_eq!(converter.try_convert(""), Some(None));
    assert_eq!(converter.try_convert("   "), Some(None));
    assert_eq!(converter.try_convert_opt(None), Some(None));
}

#[test]
fn test_values_delegate_to_inner() {
    let converter = Nullable::new(Int32Converter::new());

    assert_eq!(converter.try_convert("7"), Some(Some(7)));
    assert_eq!(converter.try_convert_opt(Some(" 8 ")), Some(Some(8)));
    assert_eq!(converter.try_convert("seven"), None);
}

#[test]
fn test_nullable_date_default_converter() {
    let converter = <Option<NaiveDate>>::default_converter();

    assert_eq!(
        converter.try_convert("2014/01/01"),
        Some(NaiveDate::from_ymd_opt(2014, 1, 1))
    );
    assert_eq!(
        converter.try_convert("9999/12/31"),
        Some(NaiveDate::from_ymd_opt(9999, 12, 31))
    );
    assert_eq!(converter.try_convert(" "), Some(None));
    assert_eq!(converter.try_convert(""), Some(None));
    assert_eq!(converter.try_convert_opt(None), Some(None));
    assert_none_convert(&converter, &["a", "1753/01/32", "0/0/0"]);
}

#[test]
fn test_default_converters_exist_for_primitives() {
    assert_eq!(i64::default_converter().try_convert("12"), Some(12));
    assert_eq!(bool::default_converter().try_convert("false"), Some(false));
    assert_eq!(String::default_converter().try_convert(" x "), Some(" x ".to_string()));
    assert_eq!(<Option<u8>>::default_converter().try_convert("300"), None);
}
