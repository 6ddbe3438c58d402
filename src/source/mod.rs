//! Line sources
//!
//! Every input surface is reduced to a sequence of numbered, filtered lines
//! before tokenizing. Numbering is 0-based and counts every line scanned from
//! the origin, so a record's line number is its true position in the source
//! even when headers, blank lines or comments were dropped before it.
//!
//! Only `\n` and `\r\n` end a line. An isolated `\r` is data, and a final line
//! without a terminator is processed like any other.
//!
//! ## Modules
//!
//! - [`encoding`] - byte to text decoding for streamed input
//! - [`pool`] - reusable decode buffers for the async path
//! - [`reader`] - blocking `BufRead` and file sources
//! - [`chunked`] - async filler task and chunked line reader
//! - [`stream`] - async streams of already split lines

pub mod chunked;
pub mod encoding;
pub mod pool;
pub mod reader;
pub mod stream;

#[cfg(test)]
pub mod tests;

use std::borrow::Cow;
use std::io;

pub use chunked::{ChunkedLineReader, DecodedLine, spawn_filler};
pub use encoding::Encoding;
pub use pool::{DecodeBufferPool, PooledBuffer};
pub use reader::{ReaderLines, open_file};
pub use stream::StreamLines;

/// One raw line, or the I/O failure that ended the source
pub type LineResult<'a> = io::Result<Cow<'a, str>>;

/// Type-erased synchronous line source
pub type BoxedLines<'a> = Box<dyn Iterator<Item = LineResult<'a>> + Send + 'a>;

/// Decides which scanned lines reach the tokenizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineFilter {
    skip_header: bool,
    comment_prefix: Option<String>,
}

impl LineFilter {
    /// An empty `comment_prefix` disables comment filtering
    pub fn new(skip_header: bool, comment_prefix: impl Into<String>) -> Self {
        let prefix = comment_prefix.into();
        Self {
            skip_header,
            comment_prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    /// Whether the line is dropped by position alone
    pub fn skips_number(&self, line_number: usize) -> bool {
        self.skip_header && line_number == 0
    }

    /// Whether a scanned line should be tokenized
    pub fn accepts(&self, line_number: usize, line: &str) -> bool {
        if self.skips_number(line_number) || line.trim().is_empty() {
            return false;
        }
        match &self.comment_prefix {
            Some(prefix) => !line.starts_with(prefix.as_str()),
            None => true,
        }
    }
}

/// Zero-copy split of a text blob into lines
#[derive(Debug, Clone)]
pub struct StrLines<'a> {
    remaining: Option<&'a str>,
}

impl<'a> StrLines<'a> {
    /// A leading byte order mark is not part of line 0
    pub fn new(text: &'a str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Self {
            remaining: (!text.is_empty()).then_some(text),
        }
    }
}

impl<'a> Iterator for StrLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.remaining?;
        match memchr::memchr(b'\n', text.as_bytes()) {
            Some(end) => {
                let rest = &text[end + 1..];
                self.remaining = (!rest.is_empty()).then_some(rest);
                Some(trim_cr(&text[..end]))
            }
            None => {
                self.remaining = None;
                Some(text)
            }
        }
    }
}

/// Drop one `\r` left in front of a `\n` terminator
pub(crate) fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Lines of an in-memory blob
pub fn str_lines(text: &str) -> BoxedLines<'_> {
    Box::new(StrLines::new(text).map(|line| Ok(Cow::Borrowed(line))))
}

/// Lines from any iterator of borrowed or owned strings, taken as-is
pub fn iter_lines<'a, I, L>(lines: I) -> BoxedLines<'a>
where
    I: IntoIterator<Item = L>,
    I::IntoIter: Send + 'a,
    L: Into<Cow<'a, str>>,
{
    Box::new(lines.into_iter().map(|line| Ok(line.into())))
}

/// Numbers every scanned line and drops the ones the filter rejects
pub struct NumberedLines<'a> {
    lines: BoxedLines<'a>,
    filter: LineFilter,
    next_number: usize,
    filtered: usize,
}

impl<'a> NumberedLines<'a> {
    pub fn new(lines: BoxedLines<'a>, filter: LineFilter) -> Self {
        Self {
            lines,
            filter,
            next_number: 0,
            filtered: 0,
        }
    }

    /// Lines read from the origin so far, filtered ones included
    pub fn lines_scanned(&self) -> usize {
        self.next_number
    }

    pub fn lines_filtered(&self) -> usize {
        self.filtered
    }
}

impl<'a> Iterator for NumberedLines<'a> {
    type Item = io::Result<(usize, Cow<'a, str>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };

            let number = self.next_number;
            self.next_number += 1;

            if self.filter.accepts(number, &line) {
                return Some(Ok((number, line)));
            }
            self.filtered += 1;
        }
    }
}
