//! RFC4180 tokenizer
//!
//! Handles the common CSV dialect: fields separated by a delimiter, optionally
//! wrapped in quotes, with a doubled quote inside a quoted field standing for
//! one literal quote. Whitespace around fields is trimmed.
//!
//! The number of tokens for a line is always the number of unquoted
//! delimiters plus one, so `a,` yields `["a", ""]`.

use std::borrow::Cow;
use std::fmt;

use super::{Tokenizer, Tokens, find_char};
use crate::constants::{DEFAULT_DELIMITER, DEFAULT_QUOTE};
use crate::{Error, Result};

/// Quote-aware tokenizer for RFC4180 style lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rfc4180Tokenizer {
    delimiter: char,
    quote: char,
}

impl Rfc4180Tokenizer {
    /// Create a tokenizer with explicit delimiter and quote characters
    ///
    /// The two characters must differ, and neither may be a line terminator.
    pub fn new(delimiter: char, quote: char) -> Result<Self> {
        if delimiter == quote {
            return Err(Error::configuration(format!(
                "Delimiter and quote character must differ (both are {:?})",
                delimiter
            )));
        }
        for (role, ch) in [("delimiter", delimiter), ("quote", quote)] {
            if ch == '\n' || ch == '\r' {
                return Err(Error::configuration(format!(
                    "The {} cannot be a line terminator",
                    role
                )));
            }
        }

        Ok(Self { delimiter, quote })
    }

    /// Create a tokenizer with the given delimiter and the default quote
    pub fn with_delimiter(delimiter: char) -> Result<Self> {
        Self::new(delimiter, DEFAULT_QUOTE)
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn quote(&self) -> char {
        self.quote
    }
}

impl Default for Rfc4180Tokenizer {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
        }
    }
}

impl fmt::Display for Rfc4180Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rfc4180Tokenizer (Quote = {:?}, Delimiter = {:?})",
            self.quote, self.delimiter
        )
    }
}

impl Tokenizer for Rfc4180Tokenizer {
    fn tokenize<'a>(&'a self, line: &'a str) -> Tokens<'a> {
        Box::new(Rfc4180Tokens {
            rest: line,
            delimiter: self.delimiter,
            quote: self.quote,
            done: false,
        })
    }
}

/// Cursor over the fields of one line
#[derive(Debug)]
pub struct Rfc4180Tokens<'a> {
    rest: &'a str,
    delimiter: char,
    quote: char,
    done: bool,
}

impl<'a> Rfc4180Tokens<'a> {
    fn trim_start(&self, s: &'a str) -> &'a str {
        let delimiter = self.delimiter;
        s.trim_start_matches(|c: char| c.is_whitespace() && c != delimiter)
    }

    /// Move past the delimiter that follows a token, or finish the line
    fn advance_after_token(&mut self, after: &'a str) {
        match after.strip_prefix(self.delimiter) {
            Some(next) => self.rest = next,
            None => {
                self.rest = "";
                self.done = true;
            }
        }
    }

    fn read_unquoted(&mut self, s: &'a str) -> Cow<'a, str> {
        match find_char(s, self.delimiter) {
            Some(pos) => {
                self.rest = &s[pos + self.delimiter.len_utf8()..];
                Cow::Borrowed(s[..pos].trim_end())
            }
            None => {
                self.rest = "";
                self.done = true;
                Cow::Borrowed(s.trim_end())
            }
        }
    }

    /// Read a quoted field starting at the opening quote
    ///
    /// Returns the unescaped content and the text after the closing quote.
    fn read_quoted(&self, s: &'a str) -> (Cow<'a, str>, &'a str) {
        let quote_len = self.quote.len_utf8();
        let body = &s[quote_len..];

        let mut unescaped: Option<String> = None;
        let mut segment_start = 0;
        let mut search_from = 0;

        loop {
            let Some(offset) = find_char(&body[search_from..], self.quote) else {
                // Unterminated: the field runs to the end of the line
                let content = match unescaped {
                    Some(mut buf) => {
                        buf.push_str(&body[segment_start..]);
                        Cow::Owned(buf)
                    }
                    None => Cow::Borrowed(body),
                };
                return (content, "");
            };

            let pos = search_from + offset;
            let after = &body[pos + quote_len..];

            if after.starts_with(self.quote) {
                // Doubled quote: keep one literal quote and continue scanning
                let buf = unescaped.get_or_insert_with(|| String::with_capacity(body.len()));
                buf.push_str(&body[segment_start..pos + quote_len]);
                segment_start = pos + 2 * quote_len;
                search_from = segment_start;
                continue;
            }

            let content = match unescaped {
                Some(mut buf) => {
                    buf.push_str(&body[segment_start..pos]);
                    Cow::Owned(buf)
                }
                None => Cow::Borrowed(&body[..pos]),
            };
            return (content, after);
        }
    }
}

impl<'a> Iterator for Rfc4180Tokens<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let s = self.trim_start(self.rest);

        let Some(first) = s.chars().next() else {
            // Empty line or trailing delimiter: one final empty token
            self.rest = "";
            self.done = true;
            return Some(Cow::Borrowed(""));
        };

        if first == self.delimiter {
            self.rest = &s[first.len_utf8()..];
            return Some(Cow::Borrowed(""));
        }

        if first != self.quote {
            return Some(self.read_unquoted(s));
        }

        let (content, after) = self.read_quoted(s);
        let after = self.trim_start(after);

        if after.is_empty() || after.starts_with(self.delimiter) {
            self.advance_after_token(after);
            return Some(content);
        }

        // Stray text between the closing quote and the next delimiter belongs
        // to the same field.
        let (stray, remaining) = match find_char(after, self.delimiter) {
            Some(pos) => (&after[..pos], &after[pos..]),
            None => (after, ""),
        };
        let mut merged = content.into_owned();
        merged.push_str(stray.trim_end());
        self.advance_after_token(remaining);
        Some(Cow::Owned(merged))
    }
}
