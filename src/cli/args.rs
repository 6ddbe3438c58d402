//! Command-line argument definitions for csvmap
//!
//! This module defines the CLI interface using the clap derive API. Parser
//! settings given as flags are layered over an optional TOML config file.

use crate::cli::schema::ColumnSpec;
use crate::config::{ParserConfig, TokenizerConfig};
use crate::constants::{DEFAULT_DELIMITER, DEFAULT_MAX_REPORTED_ERRORS, DEFAULT_QUOTE};
use crate::source::Encoding;
use crate::{Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for csvmap
#[derive(Debug, Clone, Parser)]
#[command(
    name = "csvmap",
    version,
    about = "Parse delimited text into typed records and report every field that fails to convert",
    long_about = "Tokenizes CSV and other delimited files, converts each declared column to its \
                  type and reports per-line failures. Lines can be mapped sequentially, on a \
                  worker pool, or through the async chunked pipeline."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Validate a file against declared column types
    Validate(ValidateArgs),
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    /// File to parse
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Column declarations
    ///
    /// Each column is INDEX:TYPE[?][:FORMAT]. Types: string, char, int, float,
    /// decimal, bool, date, datetime, time, duration, uuid. A trailing `?` makes
    /// blank fields valid. Dates and times take a chrono format, bool takes
    /// TRUE/FALSE literals, uuid takes a layout (hyphenated, simple, braced, urn).
    #[arg(
        short = 'c',
        long = "column",
        value_name = "SPEC",
        required = true,
        help = "Column declaration INDEX:TYPE[?][:FORMAT], repeatable"
    )]
    pub columns: Vec<ColumnSpec>,

    /// Path to a TOML parser configuration; flags override its values
    #[arg(long = "config", value_name = "PATH", help = "Parser configuration file")]
    pub config_file: Option<PathBuf>,

    #[arg(long = "skip-header", help = "Skip the first line of the file")]
    pub skip_header: bool,

    #[arg(
        long = "comment",
        value_name = "PREFIX",
        help = "Skip lines starting with this prefix"
    )]
    pub comment_prefix: Option<String>,

    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        help = "Field delimiter for the RFC4180 tokenizer"
    )]
    pub delimiter: Option<char>,

    #[arg(
        long = "quote",
        value_name = "CHAR",
        help = "Quote character for the RFC4180 tokenizer"
    )]
    pub quote: Option<char>,

    #[arg(
        short = 'j',
        long = "parallelism",
        value_name = "N",
        help = "Worker threads used to map lines (1 = sequential)"
    )]
    pub parallelism: Option<usize>,

    #[arg(long = "unordered", help = "Emit parallel results in completion order")]
    pub unordered: bool,

    #[arg(
        long = "encoding",
        value_name = "NAME",
        help = "Input encoding: utf-8, latin1 or ascii"
    )]
    pub encoding: Option<Encoding>,

    #[arg(long = "async", help = "Read the file through the async chunked pipeline")]
    pub use_async: bool,

    #[arg(
        long = "max-errors",
        value_name = "N",
        default_value_t = DEFAULT_MAX_REPORTED_ERRORS,
        help = "Number of failing lines to print"
    )]
    pub max_errors: usize,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors; overrides verbose settings
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,

    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        help = "Output format for the summary"
    )]
    pub output_format: OutputFormat,
}

/// Output format options for the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// TOML document for scripting
    Toml,
}

impl ValidateArgs {
    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if !self.file.is_file() {
            return Err(Error::configuration(format!(
                "Input file does not exist: {}",
                self.file.display()
            )));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if self.parallelism == Some(0) {
            return Err(Error::configuration(
                "Parallelism must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Parser settings given as flags; unset flags leave the file's values alone
    pub fn config_overrides(&self) -> ParserConfig {
        let tokenizer = (self.delimiter.is_some() || self.quote.is_some()).then(|| {
            TokenizerConfig::Rfc4180 {
                delimiter: self.delimiter.unwrap_or(DEFAULT_DELIMITER),
                quote: self.quote.unwrap_or(DEFAULT_QUOTE),
            }
        });

        ParserConfig {
            tokenizer,
            skip_header: self.skip_header.then_some(true),
            comment_prefix: self.comment_prefix.clone(),
            parallelism: self.parallelism,
            keep_order: self.unordered.then_some(false),
            encoding: self.encoding,
            chunk_size: None,
            chunk_queue_capacity: None,
        }
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show the progress spinner (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}
