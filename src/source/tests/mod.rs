//! Line source test helpers

use tokio_util::sync::CancellationToken;

use crate::source::{ChunkedLineReader, DecodeBufferPool, Encoding, LineFilter, spawn_filler};

mod chunked_tests;
mod encoding_tests;

/// Run `input` through the chunked path and collect `(number, text)` pairs
pub async fn chunked_lines(
    input: &[u8],
    chunk_size: usize,
    filter: LineFilter,
    encoding: Encoding,
) -> Vec<(usize, String)> {
    let cancel = CancellationToken::new();
    let (rx, filler) = spawn_filler(
        std::io::Cursor::new(input.to_vec()),
        chunk_size,
        2,
        cancel.clone(),
    );
    let mut reader = ChunkedLineReader::new(rx, encoding, filter, DecodeBufferPool::new(4));

    let mut lines = Vec::new();
    while let Some(line) = reader.next_line(&cancel).await {
        let line = line.unwrap();
        lines.push((line.number, line.text.as_str().to_string()));
    }
    filler.await.unwrap();
    lines
}
