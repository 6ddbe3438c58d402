//! Default values shared by the parser, its line sources and the CLI.

// =============================================================================
// Tokenizer Defaults
// =============================================================================

/// Default field delimiter
pub const DEFAULT_DELIMITER: char = ',';

/// Default quote character for RFC4180 fields
pub const DEFAULT_QUOTE: char = '"';

// =============================================================================
// Converter Defaults
// =============================================================================

/// Literal accepted as `true` by the default boolean converter
pub const DEFAULT_TRUE_LITERAL: &str = "true";

/// Literal accepted as `false` by the default boolean converter
pub const DEFAULT_FALSE_LITERAL: &str = "false";

/// Formats tried in order by date converters when no explicit format is set
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y"];

/// Formats tried in order by date-time converters when no explicit format is set
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats tried in order by time-of-day converters when no explicit format is set
pub const DEFAULT_TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

// =============================================================================
// Pipeline Defaults
// =============================================================================

/// Bytes requested from the async source per read
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Smallest chunk size accepted by the async filler
pub const MIN_CHUNK_SIZE: usize = 512;

/// Chunks buffered between the filler task and the line reader
pub const DEFAULT_CHUNK_QUEUE_CAPACITY: usize = 16;

/// Lines dispatched per worker in one parallel window
pub const DEFAULT_WINDOW_PER_WORKER: usize = 256;

/// Scratch buffers retained by a decode pool
pub const DECODE_POOL_CAPACITY: usize = 64;

/// Initial capacity of a blocking line reader
pub const DEFAULT_READER_CAPACITY: usize = 64 * 1024;

// =============================================================================
// CLI Defaults
// =============================================================================

/// Number of line failures printed by `csvmap validate`
pub const DEFAULT_MAX_REPORTED_ERRORS: usize = 20;

/// Lines between spinner refreshes
pub const PROGRESS_UPDATE_INTERVAL: usize = 10_000;
