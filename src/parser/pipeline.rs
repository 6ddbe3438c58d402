//! Async push pipeline
//!
//! One parse call walks `Idle -> Reading -> {Emitting -> Reading}* -> Done |
//! Cancelled`. The walk lives in [`AsyncPipeline::next_result`]; the `Stream`
//! adapter and the sink driver are thin loops over it, so the chunk decoding
//! exists exactly once.
//!
//! Suspension happens only while the line source waits for bytes. Tokenizing
//! and mapping a line never yields.

use std::fmt;
use std::io;
use std::path::Path;

use futures::future::{Ready, ready};
use futures::stream::{self, BoxStream, TryCollect, TryFilterMap};
use futures::{Stream, StreamExt, TryStreamExt};
use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::mapping::MappingResult;
use crate::parser::{CsvParser, ParseStats};
use crate::source::{ChunkedLineReader, StreamLines, spawn_filler};
use crate::{Error, Result};

/// Boxed stream of mapping results
pub type RecordStream<T> = BoxStream<'static, Result<MappingResult<T>>>;

/// Position of a pipeline in its parse call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Created, nothing read yet
    Idle,
    /// Waiting for the next accepted line
    Reading,
    /// A result was handed to the consumer
    Emitting,
    /// Source exhausted or failed
    Done,
    /// Stopped by the cancellation token
    Cancelled,
}

impl PipelineState {
    /// Whether no further results will be produced
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reading => "reading",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Receives every result of a sink-driven parse
pub trait RecordSink<T> {
    fn accept(&mut self, result: MappingResult<T>);
}

impl<T, F> RecordSink<T> for F
where
    F: FnMut(MappingResult<T>),
{
    fn accept(&mut self, result: MappingResult<T>) {
        self(result)
    }
}

enum LineFeed {
    Chunked {
        reader: ChunkedLineReader,
        filler: Option<JoinHandle<()>>,
    },
    Lines(StreamLines),
}

impl LineFeed {
    fn counts(&self) -> (usize, usize) {
        match self {
            Self::Chunked { reader, .. } => (reader.lines_scanned(), reader.lines_filtered()),
            Self::Lines(lines) => (lines.lines_scanned(), lines.lines_filtered()),
        }
    }
}

/// State machine for one async parse call
pub struct AsyncPipeline<T> {
    parser: CsvParser<T>,
    feed: LineFeed,
    cancel: CancellationToken,
    state: PipelineState,
    stats: ParseStats,
}

impl<T: Default + Send + 'static> AsyncPipeline<T> {
    fn new(parser: CsvParser<T>, feed: LineFeed, cancel: CancellationToken) -> Self {
        Self {
            parser,
            feed,
            cancel,
            state: PipelineState::Idle,
            stats: ParseStats::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Counters for the lines consumed so far
    pub fn stats(&self) -> ParseStats {
        let (lines_scanned, lines_filtered) = self.feed.counts();
        ParseStats {
            lines_scanned,
            lines_filtered,
            ..self.stats.clone()
        }
    }

    /// Produce the next result, or `None` once the pipeline is done or cancelled
    pub async fn next_result(&mut self) -> Option<Result<MappingResult<T>>> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = PipelineState::Reading;

        let parser = &self.parser;
        let next = match &mut self.feed {
            LineFeed::Chunked { reader, .. } => reader
                .next_line(&self.cancel)
                .await
                .map(|line| line.map(|line| parser.parse_line(&line.text, line.number))),
            LineFeed::Lines(lines) => lines
                .next_line(&self.cancel)
                .await
                .map(|line| line.map(|(number, text)| parser.parse_line(&text, number))),
        };

        match next {
            Some(Ok(result)) => {
                if let Some(error) = result.error() {
                    trace!("{}", error);
                }
                self.stats.record(&result);
                self.state = PipelineState::Emitting;
                Some(Ok(result))
            }
            Some(Err(e)) => {
                self.state = PipelineState::Done;
                let (scanned, _) = self.feed.counts();
                Some(Err(Error::io(format!("Failed to read line {}", scanned), e)))
            }
            None => self.finish().await.err().map(Err),
        }
    }

    /// Settle the terminal state and reap the filler task
    async fn finish(&mut self) -> Result<()> {
        let cancelled = self.cancel.is_cancelled();
        self.state = if cancelled {
            PipelineState::Cancelled
        } else {
            PipelineState::Done
        };
        self.stats.cancelled = cancelled;

        if let LineFeed::Chunked { filler, .. } = &mut self.feed {
            if let Some(handle) = filler.take() {
                if cancelled {
                    handle.abort();
                } else {
                    handle
                        .await
                        .map_err(|e| Error::pipeline(format!("Chunk filler task failed: {}", e)))?;
                }
            }
        }

        let stats = self.stats();
        if cancelled {
            debug!("Async parse cancelled: {}", stats);
        } else {
            info!("Async parse complete: {}", stats);
        }
        Ok(())
    }

    /// Expose the pipeline as a stream
    pub fn into_stream(self) -> RecordStream<T> {
        stream::unfold(self, |mut pipeline| async move {
            pipeline
                .next_result()
                .await
                .map(|result| (result, pipeline))
        })
        .boxed()
    }

    /// Push every result into `sink`, returning the run's counters
    pub async fn drive<S: RecordSink<T>>(mut self, sink: &mut S) -> Result<ParseStats> {
        while let Some(result) = self.next_result().await {
            sink.accept(result?);
        }
        Ok(self.stats())
    }

    /// Drain into a vector, failing on the first fatal error
    pub async fn collect_results(self) -> Result<Vec<MappingResult<T>>> {
        self.into_stream().try_collect().await
    }
}

impl<T> fmt::Debug for AsyncPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPipeline")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish()
    }
}

type ValidRecord<T> = Ready<Result<Option<T>>>;

fn valid_record<T>(result: MappingResult<T>) -> ValidRecord<T> {
    ready(Ok(result.into_record()))
}

/// Collect and filter helpers for any stream of mapping results
pub trait RecordStreamExt<T>: Stream<Item = Result<MappingResult<T>>> + Sized {
    /// Drain into a vector, failing on the first fatal error
    fn collect_results(self) -> TryCollect<Self, Vec<MappingResult<T>>> {
        self.try_collect()
    }

    /// Only the records of successfully mapped lines
    #[allow(clippy::type_complexity)]
    fn valid(self) -> TryFilterMap<Self, ValidRecord<T>, fn(MappingResult<T>) -> ValidRecord<T>> {
        self.try_filter_map(valid_record as fn(MappingResult<T>) -> ValidRecord<T>)
    }
}

impl<T, S> RecordStreamExt<T> for S where S: Stream<Item = Result<MappingResult<T>>> {}

impl<T: Default + Send + 'static> CsvParser<T> {
    /// Pipeline over an async byte source, decoded in chunks
    pub fn pipeline<R>(&self, reader: R, cancel: CancellationToken) -> AsyncPipeline<T>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let options = self.options();
        let (receiver, filler) = spawn_filler(
            reader,
            options.chunk_size,
            options.chunk_queue_capacity,
            cancel.clone(),
        );
        let reader = ChunkedLineReader::new(
            receiver,
            options.encoding,
            options.line_filter(),
            self.decode_pool().clone(),
        );
        debug!("Started async pipeline ({})", options);

        AsyncPipeline::new(
            self.clone(),
            LineFeed::Chunked {
                reader,
                filler: Some(filler),
            },
            cancel,
        )
    }

    /// Stream of results for an async byte source
    pub fn parse_async<R>(&self, reader: R, cancel: CancellationToken) -> RecordStream<T>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.pipeline(reader, cancel).into_stream()
    }

    /// Stream of results for a file read asynchronously
    pub async fn parse_file_async(
        &self,
        path: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<RecordStream<T>> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::io(format!("Failed to open {}", path.display()), e))?;
        Ok(self.parse_async(file, cancel))
    }

    /// Pipeline over a stream of already split lines
    pub fn line_stream_pipeline<S>(&self, lines: S, cancel: CancellationToken) -> AsyncPipeline<T>
    where
        S: Stream<Item = io::Result<String>> + Send + 'static,
    {
        let lines = StreamLines::new(lines.boxed(), self.options().line_filter());
        AsyncPipeline::new(self.clone(), LineFeed::Lines(lines), cancel)
    }

    /// Stream of results for a stream of already split lines
    pub fn parse_line_stream<S>(&self, lines: S, cancel: CancellationToken) -> RecordStream<T>
    where
        S: Stream<Item = io::Result<String>> + Send + 'static,
    {
        self.line_stream_pipeline(lines, cancel).into_stream()
    }

    /// Parse an async byte source, pushing every result into `sink`
    pub async fn parse_async_into<R, S>(
        &self,
        reader: R,
        cancel: CancellationToken,
        sink: &mut S,
    ) -> Result<ParseStats>
    where
        R: AsyncRead + Unpin + Send + 'static,
        S: RecordSink<T>,
    {
        self.pipeline(reader, cancel).drive(sink).await
    }
}
