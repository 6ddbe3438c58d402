//! Tests for the plain splitting tokenizer

use super::*;
use crate::tokenizer::SplitTokenizer;

#[test]
fn test_basic_split() {
    let tokenizer = SplitTokenizer::new(',');
    assert_eq!(tokens_of(&tokenizer, "1,2,3,4,5"), vec!["1", "2", "3", "4", "5"]);
}

#[test]
fn test_split_keeps_empty_entries_by_default() {
    let tokenizer = SplitTokenizer::new(',');
    assert_eq!(tokens_of(&tokenizer, "a,"), vec!["a", ""]);
}

#[test]
fn test_split_remove_empty() {
    let tokenizer = SplitTokenizer::new(',').remove_empty_entries(true);
    assert_eq!(
        tokens_of(&tokenizer, ",1,2,,3,,,4,5,"),
        vec!["1", "2", "3", "4", "5"]
    );
}

#[test]
fn test_split_any_of() {
    let tokenizer = SplitTokenizer::any_of(&[',', ';', '|']).unwrap();
    assert_eq!(
        tokens_of(&tokenizer, "1,2;3,4,;5,6|7|8"),
        vec!["1", "2", "3", "4", "", "5", "6", "7", "8"]
    );
}

#[test]
fn test_split_any_of_remove_empty() {
    let tokenizer = SplitTokenizer::any_of(&[',', ';', '|'])
        .unwrap()
        .remove_empty_entries(true);
    assert_eq!(
        tokens_of(&tokenizer, ";;1,,2;,;|,3;;;4,;5,6|,|7|8||"),
        vec!["1", "2", "3", "4", "5", "6", "7", "8"]
    );
}

#[test]
fn test_split_by_literal() {
    let tokenizer = SplitTokenizer::literal("\r\n").unwrap();
    assert_eq!(
        tokens_of(&tokenizer, "foo\r\nbar\r\nbaz\r\nquux"),
        vec!["foo", "bar", "baz", "quux"]
    );
}

#[test]
fn test_whitespace_preset() {
    let tokenizer = SplitTokenizer::whitespace();
    assert_eq!(
        tokens_of(&tokenizer, "  KMDW   20150301 \t 7.2  CLR"),
        vec!["KMDW", "20150301", "7.2", "CLR"]
    );
}

#[test]
fn test_trim_entries() {
    let tokenizer = SplitTokenizer::new('|').trim_entries(true);
    assert_eq!(tokens_of(&tokenizer, " a | b |c "), vec!["a", "b", "c"]);
}

#[test]
fn test_invalid_separators_are_rejected() {
    assert!(SplitTokenizer::any_of(&[]).is_err());
    assert!(SplitTokenizer::literal("").is_err());
}
