//! Tests for the chunked async line reader

use super::*;
use tokio::io::AsyncRead;

fn pairs(values: &[(usize, &str)]) -> Vec<(usize, String)> {
    values.iter().map(|(n, s)| (*n, s.to_string())).collect()
}

#[tokio::test]
async fn test_lines_split_across_chunks() {
    let input = "first line is longer than a chunk\nsecond\r\nthird";
    // Chunk size below the minimum is raised to MIN_CHUNK_SIZE, so pad the input
    let long = format!("{}\n{}", "x".repeat(700), input);

    let lines = chunked_lines(long.as_bytes(), 1, LineFilter::default(), Encoding::Utf8).await;

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].1.len(), 700);
    assert_eq!(&lines[1..], pairs(&[
        (1, "first line is longer than a chunk"),
        (2, "second"),
        (3, "third"),
    ]).as_slice());
}

#[tokio::test]
async fn test_filtering_matches_sync_path() {
    let input = b"header\n# comment\n\n1,2\n   \n3,4\n";
    let lines = chunked_lines(input, 512, LineFilter::new(true, "#"), Encoding::Utf8).await;

    assert_eq!(lines, pairs(&[(3, "1,2"), (5, "3,4")]));
}

#[tokio::test]
async fn test_final_unterminated_line_is_kept() {
    let lines = chunked_lines(b"a\nb", 512, LineFilter::default(), Encoding::Utf8).await;

    assert_eq!(lines, pairs(&[(0, "a"), (1, "b")]));
}

#[tokio::test]
async fn test_isolated_cr_is_data() {
    let lines = chunked_lines(b"a\rb\r\nc\n", 512, LineFilter::default(), Encoding::Utf8).await;

    assert_eq!(lines, pairs(&[(0, "a\rb"), (1, "c")]));
}

#[tokio::test]
async fn test_bom_and_latin1() {
    let utf8 = chunked_lines(b"\xEF\xBB\xBFid\n", 512, LineFilter::default(), Encoding::Utf8).await;
    assert_eq!(utf8, pairs(&[(0, "id")]));

    let latin1 = chunked_lines(b"na\xEFve\n", 512, LineFilter::default(), Encoding::Latin1).await;
    assert_eq!(latin1, pairs(&[(0, "naïve")]));
}

#[tokio::test]
async fn test_empty_input_yields_nothing() {
    let lines = chunked_lines(b"", 512, LineFilter::default(), Encoding::Utf8).await;

    assert!(lines.is_empty());
}

#[tokio::test]
async fn test_cancelled_reader_stops() {
    let cancel = CancellationToken::new();
    let (rx, _filler) = spawn_filler(
        std::io::Cursor::new(b"a\nb\nc\n".to_vec()),
        512,
        2,
        cancel.clone(),
    );
    let mut reader = ChunkedLineReader::new(
        rx,
        Encoding::Utf8,
        LineFilter::default(),
        DecodeBufferPool::new(2),
    );

    let first = reader.next_line(&cancel).await.unwrap().unwrap();
    assert_eq!(first.text.as_str(), "a");

    cancel.cancel();
    assert!(reader.next_line(&cancel).await.is_none());
}

struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
        _buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        std::task::Poll::Ready(Err(std::io::Error::other("device unplugged")))
    }
}

#[tokio::test]
async fn test_read_error_is_forwarded_once() {
    let cancel = CancellationToken::new();
    let (rx, filler) = spawn_filler(FailingReader, 512, 2, cancel.clone());
    let mut reader = ChunkedLineReader::new(
        rx,
        Encoding::Utf8,
        LineFilter::default(),
        DecodeBufferPool::new(2),
    );

    let error = reader.next_line(&cancel).await.unwrap().unwrap_err();
    assert_eq!(error.to_string(), "device unplugged");
    assert!(reader.next_line(&cancel).await.is_none());
    filler.await.unwrap();
}
