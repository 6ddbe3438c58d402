//! Chunked async line decoding
//!
//! A filler task reads the byte source into fixed-size chunks and pushes them
//! through a bounded channel. The channel is the only synchronization point:
//! the filler waits when the queue is full, the reader waits when it is empty.
//!
//! [`ChunkedLineReader`] appends chunks to a pending buffer, cuts complete
//! lines out of it, decodes each into a pooled scratch buffer and compacts the
//! consumed prefix away before the next refill. A partial line at the end of a
//! chunk stays pending until its terminator arrives.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::MIN_CHUNK_SIZE;
use crate::source::{DecodeBufferPool, Encoding, LineFilter, PooledBuffer};

/// Message sent by the filler task
pub type Chunk = io::Result<Vec<u8>>;

/// Spawn a task that reads `reader` in chunks of `chunk_size` bytes
///
/// The task stops at end of input, on the first read error (which is
/// forwarded), when the receiver is dropped or when `cancel` fires.
pub fn spawn_filler<R>(
    mut reader: R,
    chunk_size: usize,
    queue_capacity: usize,
    cancel: CancellationToken,
) -> (mpsc::Receiver<Chunk>, JoinHandle<()>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunk_size = chunk_size.max(MIN_CHUNK_SIZE);
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));

    let handle = tokio::spawn(async move {
        let mut total_bytes = 0usize;

        loop {
            let mut chunk = vec![0u8; chunk_size];
            let read = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Chunk filler cancelled after {} bytes", total_bytes);
                    return;
                }
                read = reader.read(&mut chunk) => read,
            };

            let message = match read {
                Ok(0) => break,
                Ok(n) => {
                    total_bytes += n;
                    chunk.truncate(n);
                    Ok(chunk)
                }
                Err(e) => Err(e),
            };
            let is_error = message.is_err();

            let sent = tokio::select! {
                _ = cancel.cancelled() => return,
                sent = tx.send(message) => sent,
            };
            if sent.is_err() || is_error {
                break;
            }
        }

        debug!("Chunk filler finished after {} bytes", total_bytes);
    });

    (rx, handle)
}

/// One decoded line that passed the filter
#[derive(Debug)]
pub struct DecodedLine {
    /// 0-based position in the source
    pub number: usize,
    /// Decoded text; returns to the pool when dropped
    pub text: PooledBuffer,
}

/// Cuts decoded, numbered, filtered lines out of a chunk stream
#[derive(Debug)]
pub struct ChunkedLineReader {
    receiver: mpsc::Receiver<Chunk>,
    pending: Vec<u8>,
    /// Start of the first byte not yet handed out as a line
    consumed: usize,
    /// Bytes before this offset are known to hold no terminator
    scanned: usize,
    exhausted: bool,
    encoding: Encoding,
    pool: DecodeBufferPool,
    filter: LineFilter,
    next_number: usize,
    filtered: usize,
}

impl ChunkedLineReader {
    pub fn new(
        receiver: mpsc::Receiver<Chunk>,
        encoding: Encoding,
        filter: LineFilter,
        pool: DecodeBufferPool,
    ) -> Self {
        Self {
            receiver,
            pending: Vec::new(),
            consumed: 0,
            scanned: 0,
            exhausted: false,
            encoding,
            pool,
            filter,
            next_number: 0,
            filtered: 0,
        }
    }

    /// Lines cut from the source so far, filtered ones included
    pub fn lines_scanned(&self) -> usize {
        self.next_number
    }

    pub fn lines_filtered(&self) -> usize {
        self.filtered
    }

    /// Next accepted line, `None` at end of input or once `cancel` fires
    ///
    /// Suspends only while waiting for the next chunk.
    pub async fn next_line(&mut self, cancel: &CancellationToken) -> Option<io::Result<DecodedLine>> {
        loop {
            if cancel.is_cancelled() {
                self.discard();
                return None;
            }

            if let Some(offset) = memchr::memchr(b'\n', &self.pending[self.scanned..]) {
                let end = self.scanned + offset;
                let start = self.consumed;
                self.consumed = end + 1;
                self.scanned = self.consumed;

                let raw = &self.pending[start..end];
                let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
                let number = self.next_number;
                self.next_number += 1;
                match accept(raw, number, self.encoding, &self.pool, &self.filter) {
                    Some(line) => return Some(Ok(line)),
                    None => self.filtered += 1,
                }
                continue;
            }
            self.scanned = self.pending.len();

            if self.exhausted {
                if self.consumed < self.pending.len() {
                    let start = self.consumed;
                    self.consumed = self.pending.len();
                    let number = self.next_number;
                    self.next_number += 1;
                    let raw = &self.pending[start..];
                    match accept(raw, number, self.encoding, &self.pool, &self.filter) {
                        Some(line) => return Some(Ok(line)),
                        None => self.filtered += 1,
                    }
                }
                self.discard();
                return None;
            }

            self.compact();

            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.discard();
                    return None;
                }
                chunk = self.receiver.recv() => chunk,
            };

            match chunk {
                Some(Ok(bytes)) => self.pending.extend_from_slice(&bytes),
                Some(Err(e)) => {
                    self.exhausted = true;
                    self.discard();
                    return Some(Err(e));
                }
                None => self.exhausted = true,
            }
        }
    }

    /// Drop consumed bytes so the pending buffer only holds a partial line
    fn compact(&mut self) {
        if self.consumed == 0 {
            return;
        }
        self.pending.drain(..self.consumed);
        self.scanned -= self.consumed;
        self.consumed = 0;
    }

    fn discard(&mut self) {
        self.pending = Vec::new();
        self.consumed = 0;
        self.scanned = 0;
    }
}

/// Filter and decode one raw line, `None` when the filter drops it
fn accept(
    raw: &[u8],
    number: usize,
    encoding: Encoding,
    pool: &DecodeBufferPool,
    filter: &LineFilter,
) -> Option<DecodedLine> {
    if filter.skips_number(number) {
        return None;
    }

    let raw = if number == 0 { encoding.strip_bom(raw) } else { raw };
    let mut text = pool.rent(encoding.max_decoded_len(raw.len()));
    encoding.decode_into(raw, &mut text);

    filter
        .accepts(number, &text)
        .then_some(DecodedLine { number, text })
}
