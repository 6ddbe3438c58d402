//! Line tokenizers
//!
//! A tokenizer turns one logical line into an ordered, lazily produced
//! sequence of raw field values. Tokens borrow from the line whenever possible
//! and only allocate when a field needs un-escaping.
//!
//! ## Strategies
//!
//! - [`Rfc4180Tokenizer`] - quoted fields, doubled-quote escapes, whitespace trimming
//! - [`SplitTokenizer`] - plain splitting on a set of characters or a literal string
//!
//! Both implement [`Tokenizer`], so a parser can be configured with either one
//! (or a custom strategy) through `Arc<dyn Tokenizer>`.

pub mod rfc4180;
pub mod split;

#[cfg(test)]
pub mod tests;

use std::borrow::Cow;
use std::fmt;

pub use rfc4180::Rfc4180Tokenizer;
pub use split::{Separator, SplitTokenizer};

/// Lazy token sequence for one line
pub type Tokens<'a> = Box<dyn Iterator<Item = Cow<'a, str>> + 'a>;

/// Splits a single line into raw field values
///
/// Implementations must keep all cursor state inside the returned iterator so
/// that one tokenizer can serve many lines concurrently.
pub trait Tokenizer: fmt::Debug + fmt::Display + Send + Sync {
    /// Tokenize `line` into its fields
    fn tokenize<'a>(&'a self, line: &'a str) -> Tokens<'a>;
}

/// Find `needle` in `haystack`, using memchr for ASCII characters
pub(crate) fn find_char(haystack: &str, needle: char) -> Option<usize> {
    if needle.is_ascii() {
        memchr::memchr(needle as u8, haystack.as_bytes())
    } else {
        haystack.find(needle)
    }
}
