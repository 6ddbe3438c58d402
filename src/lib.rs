//! csvmap Library
//!
//! A Rust library for parsing delimited text into strongly typed records.
//!
//! This library provides tools for:
//! - Tokenizing lines with an RFC4180 quote-aware tokenizer or plain splitting
//! - Converting field text into numbers, booleans, dates, enums, UUIDs and more
//! - Binding token indices to record fields through a mapping table
//! - Reading numbered, filtered lines from strings, readers, files and async sources
//! - Mapping lines sequentially, on a worker pool, or through an async stream
//! - Reporting every field failure of a line without aborting the parse
//!
//! ```no_run
//! use csvmap::{CsvMapping, CsvParser, CsvParserOptions};
//!
//! #[derive(Debug, Default)]
//! struct Reading {
//!     station: String,
//!     value: f64,
//! }
//!
//! # fn main() -> csvmap::Result<()> {
//! let mapping = CsvMapping::<Reading>::new()
//!     .map_property(0, |r, v: String| r.station = v)
//!     .map_property(1, |r, v: f64| r.value = v);
//! let options = CsvParserOptions::with_header(true, "#");
//! let parser = CsvParser::new(options, mapping)?;
//!
//! for result in parser.parse_file("readings.csv")? {
//!     match result?.into_result() {
//!         Ok(reading) => println!("{:?}", reading),
//!         Err(error) => eprintln!("{}", error),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod source;
pub mod tokenizer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod schema;
}

// Re-export commonly used types
pub use config::{CsvParserOptions, ParserConfig, TokenizerConfig};
pub use converter::{DefaultConverter, Nullable, TypeConverter};
pub use error::{Error, Result};
pub use mapping::{CsvMapping, FieldError, FieldErrorKind, LineError, MappingResult};
pub use parser::{CsvParser, ParseStats, RecordSink, RecordStreamExt, Records};
pub use source::Encoding;
pub use tokenizer::{Rfc4180Tokenizer, SplitTokenizer, Tokenizer};
