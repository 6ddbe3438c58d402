//! Async line streams
//!
//! Lines that are already split (for example `tokio_stream::wrappers::LinesStream`
//! or a channel of strings) bypass the chunked decoder and only go through
//! numbering and filtering.

use std::fmt;
use std::io;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::source::LineFilter;

/// Numbered, filtered lines of an async stream of strings
pub struct StreamLines {
    lines: BoxStream<'static, io::Result<String>>,
    filter: LineFilter,
    next_number: usize,
    filtered: usize,
}

impl StreamLines {
    pub fn new(lines: BoxStream<'static, io::Result<String>>, filter: LineFilter) -> Self {
        Self {
            lines,
            filter,
            next_number: 0,
            filtered: 0,
        }
    }

    pub fn lines_scanned(&self) -> usize {
        self.next_number
    }

    pub fn lines_filtered(&self) -> usize {
        self.filtered
    }

    /// Next accepted line, `None` at end of stream or once `cancel` fires
    pub async fn next_line(&mut self, cancel: &CancellationToken) -> Option<io::Result<(usize, String)>> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }

            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                line = self.lines.next() => line?,
            };
            let line = match line {
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

impl fmt::Debug for StreamLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamLines")
            .field("filter", &self.filter)
            .field("next_number", &self.next_number)
            .finish()
    }
}
