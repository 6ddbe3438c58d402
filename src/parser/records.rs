//! Pull-based record iterator

use std::collections::VecDeque;
use std::fmt;
use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::mapping::MappingResult;
use crate::parser::parallel::{self, WindowLine};
use crate::parser::{CsvParser, ParseStats};
use crate::source::NumberedLines;
use crate::{Error, Result};

/// Lazy sequence of mapping results for one parse call
///
/// Yields `Err` only for a fatal I/O failure of the source, after which the
/// iterator is finished. Cancellation ends the sequence without an error.
pub struct Records<'a, T> {
    parser: CsvParser<T>,
    lines: NumberedLines<'a>,
    cancel: Option<CancellationToken>,
    /// Mapped results of the current parallel window
    buffered: VecDeque<MappingResult<T>>,
    /// Read error hit while filling a window, reported once the window drains
    deferred_error: Option<io::Error>,
    source_done: bool,
    finished: bool,
    stats: ParseStats,
}

impl<'a, T: Default + Send + 'static> Records<'a, T> {
    pub(crate) fn new(parser: CsvParser<T>, lines: NumberedLines<'a>) -> Self {
        Self {
            parser,
            lines,
            cancel: None,
            buffered: VecDeque::new(),
            deferred_error: None,
            source_done: false,
            finished: false,
            stats: ParseStats::new(),
        }
    }

    /// Stop producing results once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Counters for the lines consumed so far
    pub fn stats(&self) -> ParseStats {
        ParseStats {
            lines_scanned: self.lines.lines_scanned(),
            lines_filtered: self.lines.lines_filtered(),
            ..self.stats.clone()
        }
    }

    /// Drain into a vector, failing on the first fatal error
    pub fn collect_results(self) -> Result<Vec<MappingResult<T>>> {
        self.collect()
    }

    /// Only the records of successfully mapped lines
    pub fn valid(self) -> impl Iterator<Item = Result<T>> + 'a {
        self.filter_map(|result| match result {
            Ok(mapped) => mapped.into_record().map(Ok),
            Err(e) => Some(Err(e)),
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|token| token.is_cancelled())
    }

    fn emit(&mut self, result: MappingResult<T>) -> Option<Result<MappingResult<T>>> {
        if let Some(error) = result.error() {
            trace!("{}", error);
        }
        self.stats.record(&result);
        Some(Ok(result))
    }

    fn fail(&mut self, error: io::Error) -> Option<Result<MappingResult<T>>> {
        self.finished = true;
        Some(Err(Error::io(
            format!("Failed to read line {}", self.lines.lines_scanned()),
            error,
        )))
    }

    fn finish(&mut self) -> Option<Result<MappingResult<T>>> {
        if !self.finished {
            self.finished = true;
            self.stats.cancelled = self.is_cancelled();
            let stats = self.stats();
            if stats.cancelled {
                debug!("Parse cancelled: {}", stats);
            } else {
                info!("Parse complete: {}", stats);
            }
        }
        None
    }

    /// Read the next window and map it on the worker pool
    fn fill_window(&mut self) {
        let capacity = self.parser.options().window_size();
        let mut window: Vec<WindowLine<'a>> = Vec::with_capacity(capacity);

        while window.len() < capacity {
            match self.lines.next() {
                Some(Ok(line)) => window.push(line),
                Some(Err(e)) => {
                    self.deferred_error = Some(e);
                    self.source_done = true;
                    break;
                }
                None => {
                    self.source_done = true;
                    break;
                }
            }
        }

        if window.is_empty() {
            return;
        }

        let Some(workers) = self.parser.workers() else {
            return;
        };
        let results = parallel::map_window(
            &self.parser,
            workers,
            &window,
            self.parser.options().keep_order,
            self.cancel.as_ref(),
        );
        trace!("Mapped window of {} lines", window.len());
        self.buffered.extend(results);
    }
}

impl<'a, T: Default + Send + 'static> Iterator for Records<'a, T> {
    type Item = Result<MappingResult<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if self.is_cancelled() {
                self.buffered.clear();
                return self.finish();
            }
            if let Some(result) = self.buffered.pop_front() {
                return self.emit(result);
            }
            if let Some(error) = self.deferred_error.take() {
                return self.fail(error);
            }
            if self.source_done {
                return self.finish();
            }

            if self.parser.workers().is_some() {
                self.fill_window();
                continue;
            }

            return match self.lines.next() {
                Some(Ok((number, line))) => {
                    let result = self.parser.parse_line(&line, number);
                    self.emit(result)
                }
                Some(Err(e)) => self.fail(e),
                None => {
                    self.source_done = true;
                    self.finish()
                }
            };
        }
    }
}

impl<T> fmt::Debug for Records<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Records")
            .field("buffered", &self.buffered.len())
            .field("source_done", &self.source_done)
            .field("finished", &self.finished)
            .finish()
    }
}
