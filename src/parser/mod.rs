//! CSV parser façade
//!
//! [`CsvParser`] composes a line source, the configured tokenizer and a
//! mapping table. It offers two shapes over the same per-line work:
//!
//! - pull: [`Records`], a blocking iterator that maps on the caller thread or
//!   fans windows of lines out over a worker pool
//! - push: [`AsyncPipeline`], fed by an async byte source through the chunked
//!   decoder and exposed as a `Stream` or driven into a [`RecordSink`]
//!
//! Field and line failures are values inside each [`MappingResult`]. Only I/O
//! and pipeline faults surface as [`crate::Error`], and they end the parse.

pub mod parallel;
pub mod pipeline;
pub mod records;
pub mod stats;

#[cfg(test)]
pub mod tests;

use std::borrow::Cow;
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;

use rayon::ThreadPool;
use tracing::debug;

use crate::Result;
use crate::config::CsvParserOptions;
use crate::mapping::{CsvMapping, MappingResult};
use crate::source::{self, DecodeBufferPool, NumberedLines, ReaderLines};

pub use pipeline::{AsyncPipeline, PipelineState, RecordSink, RecordStream, RecordStreamExt};
pub use records::Records;
pub use stats::ParseStats;

struct ParserInner<T> {
    options: CsvParserOptions,
    mapping: CsvMapping<T>,
    workers: Option<ThreadPool>,
    decode_pool: DecodeBufferPool,
}

/// Parses delimited text into records of type `T`
///
/// Cloning is cheap; clones share options, mapping table and worker pool.
pub struct CsvParser<T> {
    inner: Arc<ParserInner<T>>,
}

impl<T> Clone for CsvParser<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for CsvParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvParser")
            .field("options", &self.inner.options)
            .field("mapping", &self.inner.mapping)
            .finish()
    }
}

impl<T: Default + Send + 'static> CsvParser<T> {
    /// Build a parser, validating the options and starting the worker pool
    /// when more than one worker is requested
    pub fn new(options: CsvParserOptions, mapping: CsvMapping<T>) -> Result<Self> {
        options.validate()?;

        let workers = if options.is_parallel() {
            Some(parallel::build_pool(options.degree_of_parallelism)?)
        } else {
            None
        };
        debug!("Created parser ({}) with {} mapped fields", options, mapping.len());

        Ok(Self {
            inner: Arc::new(ParserInner {
                options,
                mapping,
                workers,
                decode_pool: DecodeBufferPool::default(),
            }),
        })
    }

    pub fn options(&self) -> &CsvParserOptions {
        &self.inner.options
    }

    pub fn mapping(&self) -> &CsvMapping<T> {
        &self.inner.mapping
    }

    /// Tokenize and map one line that has already passed filtering
    pub fn parse_line(&self, line: &str, line_number: usize) -> MappingResult<T> {
        let tokens = self.inner.options.tokenizer.tokenize(line);
        self.inner.mapping.map_tokens(tokens, line_number)
    }

    /// Parse an in-memory text blob
    pub fn parse_str<'a>(&self, text: &'a str) -> Records<'a, T> {
        self.records(source::str_lines(text))
    }

    /// Parse already split lines, taken as-is
    pub fn parse_lines<'a, I, L>(&self, lines: I) -> Records<'a, T>
    where
        I: IntoIterator<Item = L>,
        I::IntoIter: Send + 'a,
        L: Into<Cow<'a, str>>,
    {
        self.records(source::iter_lines(lines))
    }

    /// Parse a blocking reader, decoding with the configured encoding
    pub fn parse_reader<'a, R>(&self, reader: R) -> Records<'a, T>
    where
        R: BufRead + Send + 'a,
    {
        let lines = ReaderLines::new(reader, self.inner.options.encoding);
        self.records(Box::new(lines.map(|line| line.map(Cow::Owned))))
    }

    /// Parse a file; failing to open it is an I/O error
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Records<'static, T>> {
        let lines = source::open_file(path.as_ref(), self.inner.options.encoding)?;
        Ok(self.records(Box::new(lines.map(|line| line.map(Cow::Owned)))))
    }

    fn records<'a>(&self, lines: source::BoxedLines<'a>) -> Records<'a, T> {
        let lines = NumberedLines::new(lines, self.inner.options.line_filter());
        Records::new(self.clone(), lines)
    }

    pub(crate) fn workers(&self) -> Option<&ThreadPool> {
        self.inner.workers.as_ref()
    }

    pub(crate) fn decode_pool(&self) -> &DecodeBufferPool {
        &self.inner.decode_pool
    }
}
