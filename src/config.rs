//! Parser configuration
//!
//! [`CsvParserOptions`] is the immutable option bundle a parser is built
//! with. Library callers assemble it with the `with_*` builders; the CLI
//! loads a [`ParserConfig`] from TOML, layers command-line flags on top and
//! converts the result into options.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    DEFAULT_CHUNK_QUEUE_CAPACITY, DEFAULT_CHUNK_SIZE, DEFAULT_DELIMITER, DEFAULT_QUOTE,
    DEFAULT_WINDOW_PER_WORKER, MIN_CHUNK_SIZE,
};
use crate::source::{Encoding, LineFilter};
use crate::tokenizer::{Rfc4180Tokenizer, SplitTokenizer, Tokenizer};
use crate::{Error, Result};

/// Options shared read-only by every line a parser processes
#[derive(Debug, Clone)]
pub struct CsvParserOptions {
    /// Strategy that splits each line into tokens
    pub tokenizer: Arc<dyn Tokenizer>,

    /// Drop line 0 before tokenizing
    pub skip_header: bool,

    /// Lines starting with this prefix are skipped; empty disables
    pub comment_prefix: String,

    /// Worker threads used to map lines; 1 keeps everything on the caller thread
    pub degree_of_parallelism: usize,

    /// Re-sequence parallel results into source order
    pub keep_order: bool,

    /// Encoding of byte sources
    pub encoding: Encoding,

    /// Bytes read per chunk on the async path
    pub chunk_size: usize,

    /// Chunks buffered between the async filler and the line reader
    pub chunk_queue_capacity: usize,

    /// Lines per worker in one parallel window
    pub window_per_worker: usize,
}

impl Default for CsvParserOptions {
    fn default() -> Self {
        Self {
            tokenizer: Arc::new(Rfc4180Tokenizer::default()),
            skip_header: false,
            comment_prefix: String::new(),
            degree_of_parallelism: num_cpus::get(),
            keep_order: true,
            encoding: Encoding::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_queue_capacity: DEFAULT_CHUNK_QUEUE_CAPACITY,
            window_per_worker: DEFAULT_WINDOW_PER_WORKER,
        }
    }
}

impl CsvParserOptions {
    /// RFC4180 tokenizer with default delimiter and quote
    pub fn new() -> Self {
        Self::default()
    }

    /// Header row skipped, comment lines starting with `comment_prefix` dropped
    pub fn with_header(skip_header: bool, comment_prefix: impl Into<String>) -> Self {
        Self::default()
            .with_skip_header(skip_header)
            .with_comment_prefix(comment_prefix)
    }

    /// Set the tokenizer
    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Set a tokenizer that is already shared
    pub fn with_shared_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_skip_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    pub fn with_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Set the number of mapping workers
    pub fn with_degree_of_parallelism(mut self, degree: usize) -> Self {
        self.degree_of_parallelism = degree;
        self
    }

    /// Map every line on the caller thread
    pub fn sequential(self) -> Self {
        self.with_degree_of_parallelism(1)
    }

    pub fn with_keep_order(mut self, keep_order: bool) -> Self {
        self.keep_order = keep_order;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_chunk_queue_capacity(mut self, capacity: usize) -> Self {
        self.chunk_queue_capacity = capacity;
        self
    }

    pub fn with_window_per_worker(mut self, lines: usize) -> Self {
        self.window_per_worker = lines;
        self
    }

    /// Filter derived from the header and comment settings
    pub fn line_filter(&self) -> LineFilter {
        LineFilter::new(self.skip_header, self.comment_prefix.clone())
    }

    /// Whether lines are mapped on a worker pool
    pub fn is_parallel(&self) -> bool {
        self.degree_of_parallelism > 1
    }

    /// Lines read ahead for one parallel window
    pub fn window_size(&self) -> usize {
        self.degree_of_parallelism.saturating_mul(self.window_per_worker)
    }

    /// Reject settings no parser can run with
    pub fn validate(&self) -> Result<()> {
        if self.degree_of_parallelism == 0 {
            return Err(Error::configuration(
                "Degree of parallelism must be at least 1",
            ));
        }
        if self.window_per_worker == 0 {
            return Err(Error::configuration("Window per worker must be at least 1"));
        }
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::configuration(format!(
                "Chunk size must be at least {} bytes, got {}",
                MIN_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.chunk_queue_capacity == 0 {
            return Err(Error::configuration(
                "Chunk queue capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CsvParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, skip_header={}, comment_prefix={:?}, parallelism={}, keep_order={}, encoding={}",
            self.tokenizer,
            self.skip_header,
            self.comment_prefix,
            self.degree_of_parallelism,
            self.keep_order,
            self.encoding
        )
    }
}

/// Tokenizer section of a configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenizerConfig {
    /// Quoted fields with doubled-quote escapes
    Rfc4180 {
        #[serde(default = "default_delimiter")]
        delimiter: char,
        #[serde(default = "default_quote")]
        quote: char,
    },
    /// Plain splitting on any of `separators`, or on `literal` when set
    Split {
        #[serde(default)]
        separators: Vec<char>,
        #[serde(default)]
        literal: Option<String>,
        #[serde(default)]
        remove_empty: bool,
        #[serde(default)]
        trim: bool,
    },
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_quote() -> char {
    DEFAULT_QUOTE
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self::Rfc4180 {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
        }
    }
}

impl TokenizerConfig {
    /// Build the configured tokenizer
    pub fn build(&self) -> Result<Arc<dyn Tokenizer>> {
        match self {
            Self::Rfc4180 { delimiter, quote } => {
                Ok(Arc::new(Rfc4180Tokenizer::new(*delimiter, *quote)?))
            }
            Self::Split {
                separators,
                literal,
                remove_empty,
                trim,
            } => {
                let tokenizer = match literal {
                    Some(literal) => SplitTokenizer::literal(literal.clone())?,
                    None if separators.is_empty() => {
                        return Err(Error::configuration(
                            "Split tokenizer needs `separators` or `literal`",
                        ));
                    }
                    None => SplitTokenizer::any_of(separators)?,
                };
                Ok(Arc::new(
                    tokenizer
                        .remove_empty_entries(*remove_empty)
                        .trim_entries(*trim),
                ))
            }
        }
    }
}

/// File-backed parser configuration; every field is optional so that
/// command-line flags can be layered on top
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    #[serde(default)]
    pub tokenizer: Option<TokenizerConfig>,
    #[serde(default)]
    pub skip_header: Option<bool>,
    #[serde(default)]
    pub comment_prefix: Option<String>,
    #[serde(default)]
    pub parallelism: Option<usize>,
    #[serde(default)]
    pub keep_order: Option<bool>,
    #[serde(default)]
    pub encoding: Option<Encoding>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub chunk_queue_capacity: Option<usize>,
}

impl ParserConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded parser config from {}", path.display());
        Ok(config)
    }

    /// Values set in `overrides` replace the ones in `self`
    pub fn merge(self, overrides: ParserConfig) -> Self {
        Self {
            tokenizer: overrides.tokenizer.or(self.tokenizer),
            skip_header: overrides.skip_header.or(self.skip_header),
            comment_prefix: overrides.comment_prefix.or(self.comment_prefix),
            parallelism: overrides.parallelism.or(self.parallelism),
            keep_order: overrides.keep_order.or(self.keep_order),
            encoding: overrides.encoding.or(self.encoding),
            chunk_size: overrides.chunk_size.or(self.chunk_size),
            chunk_queue_capacity: overrides.chunk_queue_capacity.or(self.chunk_queue_capacity),
        }
    }

    /// Resolve unset values to defaults and validate
    pub fn into_options(self) -> Result<CsvParserOptions> {
        let defaults = CsvParserOptions::default();
        let tokenizer = self.tokenizer.unwrap_or_default().build()?;

        let options = CsvParserOptions {
            tokenizer,
            skip_header: self.skip_header.unwrap_or(defaults.skip_header),
            comment_prefix: self.comment_prefix.unwrap_or(defaults.comment_prefix),
            degree_of_parallelism: self.parallelism.unwrap_or(defaults.degree_of_parallelism),
            keep_order: self.keep_order.unwrap_or(defaults.keep_order),
            encoding: self.encoding.unwrap_or(defaults.encoding),
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            chunk_queue_capacity: self
                .chunk_queue_capacity
                .unwrap_or(defaults.chunk_queue_capacity),
            window_per_worker: defaults.window_per_worker,
        };
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_options() {
        let options = CsvParserOptions::default();
        assert!(!options.skip_header);
        assert!(options.comment_prefix.is_empty());
        assert!(options.keep_order);
        assert_eq!(options.encoding, Encoding::Utf8);
        assert_eq!(options.degree_of_parallelism, num_cpus::get());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let options = CsvParserOptions::with_header(true, "#")
            .with_degree_of_parallelism(4)
            .with_window_per_worker(10)
            .with_keep_order(false);

        assert!(options.skip_header);
        assert_eq!(options.comment_prefix, "#");
        assert!(options.is_parallel());
        assert_eq!(options.window_size(), 40);
        assert!(!options.sequential().is_parallel());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_workers = CsvParserOptions::new().with_degree_of_parallelism(0);
        assert!(zero_workers.validate().is_err());

        let tiny_chunks = CsvParserOptions::new().with_chunk_size(MIN_CHUNK_SIZE - 1);
        assert!(tiny_chunks.validate().is_err());

        let no_queue = CsvParserOptions::new().with_chunk_queue_capacity(0);
        assert!(no_queue.validate().is_err());

        let no_window = CsvParserOptions::new().with_window_per_worker(0);
        assert!(no_window.validate().is_err());
    }

    #[test]
    fn test_parser_config_from_toml() {
        let config = ParserConfig::from_toml_str(
            r#"
            skip_header = true
            comment_prefix = "--"
            parallelism = 2
            encoding = "latin1"

            [tokenizer]
            kind = "rfc4180"
            delimiter = ";"
            "#,
        )
        .unwrap();

        assert_eq!(config.skip_header, Some(true));
        assert_eq!(config.encoding, Some(Encoding::Latin1));
        assert_eq!(
            config.tokenizer,
            Some(TokenizerConfig::Rfc4180 {
                delimiter: ';',
                quote: DEFAULT_QUOTE
            })
        );

        let options = config.into_options().unwrap();
        assert_eq!(options.comment_prefix, "--");
        assert_eq!(options.degree_of_parallelism, 2);
        let tokens: Vec<_> = options.tokenizer.tokenize("a; \"b;c\"").collect();
        assert_eq!(tokens, vec!["a", "b;c"]);
    }

    #[test]
    fn test_parser_config_rejects_unknown_fields() {
        assert!(ParserConfig::from_toml_str("delimiter = \",\"").is_err());
        assert!(ParserConfig::from_toml_str("encoding = \"utf-16\"").is_err());
    }

    #[test]
    fn test_split_tokenizer_config() {
        let config = ParserConfig::from_toml_str(
            r#"
            [tokenizer]
            kind = "split"
            separators = ["|", ","]
            remove_empty = true
            trim = true
            "#,
        )
        .unwrap();
        let tokenizer = config.tokenizer.unwrap().build().unwrap();
        let tokens: Vec<_> = tokenizer.tokenize(" a | b,,c ").collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);

        let empty = TokenizerConfig::Split {
            separators: Vec::new(),
            literal: None,
            remove_empty: false,
            trim: false,
        };
        assert!(empty.build().is_err());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = ParserConfig {
            skip_header: Some(true),
            parallelism: Some(8),
            ..ParserConfig::default()
        };
        let overrides = ParserConfig {
            parallelism: Some(1),
            keep_order: Some(false),
            ..ParserConfig::default()
        };

        let merged = base.merge(overrides);
        assert_eq!(merged.skip_header, Some(true));
        assert_eq!(merged.parallelism, Some(1));
        assert_eq!(merged.keep_order, Some(false));
        assert_eq!(merged.encoding, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "skip_header = true").unwrap();
        file.flush().unwrap();

        let config = ParserConfig::load(file.path()).unwrap();
        assert_eq!(config.skip_header, Some(true));

        let missing = ParserConfig::load(Path::new("/no/such/csvmap.toml"));
        assert!(missing.unwrap_err().is_io());
    }
}
