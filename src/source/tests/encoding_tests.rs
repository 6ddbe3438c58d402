//! Tests for byte encodings

use crate::source::Encoding;
use std::borrow::Cow;

#[test]
fn test_utf8_valid_is_borrowed() {
    assert!(matches!(Encoding::Utf8.decode(b"abc"), Cow::Borrowed("abc")));
}

#[test]
fn test_utf8_invalid_is_replaced() {
    assert_eq!(Encoding::Utf8.decode(b"a\xFFb"), "a\u{FFFD}b");
}

#[test]
fn test_latin1_maps_high_bytes() {
    assert_eq!(Encoding::Latin1.decode(b"\xC4\xD6\xDC"), "ÄÖÜ");
    assert!(matches!(Encoding::Latin1.decode(b"plain"), Cow::Borrowed("plain")));
}

#[test]
fn test_ascii_replaces_high_bytes() {
    assert_eq!(Encoding::Ascii.decode(b"a\xE9"), "a\u{FFFD}");
}

#[test]
fn test_worst_case_length_bounds_decoded_output() {
    let bytes = [0xFFu8; 10];
    for encoding in [Encoding::Utf8, Encoding::Latin1, Encoding::Ascii] {
        let decoded = encoding.decode(&bytes);
        assert!(decoded.len() <= encoding.max_decoded_len(bytes.len()));
    }
}

#[test]
fn test_bom_only_stripped_for_utf8() {
    let bytes = b"\xEF\xBB\xBFx";
    assert_eq!(Encoding::Utf8.strip_bom(bytes), b"x");
    assert_eq!(Encoding::Latin1.strip_bom(bytes), bytes);
}

#[test]
fn test_parse_encoding_labels() {
    assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
    assert_eq!("iso_8859_1".parse::<Encoding>().unwrap(), Encoding::Latin1);
    assert_eq!("ascii".parse::<Encoding>().unwrap(), Encoding::Ascii);
    assert!("ebcdic".parse::<Encoding>().is_err());
}
