//! Plain splitting tokenizer
//!
//! No quoting rules: the line is cut at every separator. Useful for
//! whitespace-aligned files and multi-character delimiters.

use std::borrow::Cow;
use std::fmt;

use super::{Tokenizer, Tokens};
use crate::{Error, Result};

/// What a [`SplitTokenizer`] splits on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Separator {
    /// Split on any of these characters
    AnyOf(Vec<char>),
    /// Split on this exact string
    Literal(String),
}

/// Tokenizer that splits on a character set or a literal string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTokenizer {
    separator: Separator,
    remove_empty: bool,
    trim: bool,
}

impl SplitTokenizer {
    /// Split on a single character, keeping empty entries
    pub fn new(separator: char) -> Self {
        Self {
            separator: Separator::AnyOf(vec![separator]),
            remove_empty: false,
            trim: false,
        }
    }

    /// Split on any of `separators`
    pub fn any_of(separators: &[char]) -> Result<Self> {
        if separators.is_empty() {
            return Err(Error::configuration(
                "Split tokenizer needs at least one separator character",
            ));
        }

        Ok(Self {
            separator: Separator::AnyOf(separators.to_vec()),
            remove_empty: false,
            trim: false,
        })
    }

    /// Split on a literal string such as `"||"`
    pub fn literal(separator: impl Into<String>) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(Error::configuration(
                "Split tokenizer literal separator cannot be empty",
            ));
        }

        Ok(Self {
            separator: Separator::Literal(separator),
            remove_empty: false,
            trim: false,
        })
    }

    /// Split on runs of spaces and tabs
    pub fn whitespace() -> Self {
        Self {
            separator: Separator::AnyOf(vec![' ', '\t']),
            remove_empty: true,
            trim: false,
        }
    }

    /// Drop empty entries (after trimming, if enabled)
    pub fn remove_empty_entries(mut self, remove: bool) -> Self {
        self.remove_empty = remove;
        self
    }

    /// Trim surrounding whitespace from each entry
    pub fn trim_entries(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn separator(&self) -> &Separator {
        &self.separator
    }

    fn finish<'a, I>(&'a self, parts: I) -> Tokens<'a>
    where
        I: Iterator<Item = &'a str> + 'a,
    {
        let trim = self.trim;
        let remove_empty = self.remove_empty;

        Box::new(
            parts
                .map(move |part| if trim { part.trim() } else { part })
                .filter(move |part| !(remove_empty && part.is_empty()))
                .map(Cow::Borrowed),
        )
    }
}

impl fmt::Display for SplitTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SplitTokenizer (Separator = {:?}, RemoveEmpty = {}, Trim = {})",
            self.separator, self.remove_empty, self.trim
        )
    }
}

impl Tokenizer for SplitTokenizer {
    fn tokenize<'a>(&'a self, line: &'a str) -> Tokens<'a> {
        match &self.separator {
            Separator::AnyOf(chars) if chars.len() == 1 => self.finish(line.split(chars[0])),
            Separator::AnyOf(chars) => {
                self.finish(line.split(move |c: char| chars.contains(&c)))
            }
            Separator::Literal(literal) => self.finish(line.split(literal.as_str())),
        }
    }
}
