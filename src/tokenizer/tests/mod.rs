//! Tokenizer test helpers

use super::Tokenizer;

mod split_tests;

/// Tokenize a line and collect owned tokens for comparison
pub fn tokens_of(tokenizer: &dyn Tokenizer, line: &str) -> Vec<String> {
    tokenizer.tokenize(line).map(|t| t.into_owned()).collect()
}
