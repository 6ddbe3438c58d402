//! Error handling for csvmap operations.
//!
//! Only failures that stop a whole parse live here: I/O faults, invalid
//! configuration and a crashed pipeline task. Per-field and per-line
//! conversion failures are ordinary values (see [`crate::mapping::LineError`])
//! and never surface through this type.

use thiserror::Error;

/// Result type alias for csvmap
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal error kinds for parsing operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed; no further lines can be read
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parser, tokenizer or converter configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Background pipeline task failed
    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a pipeline error
    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline {
            message: message.into(),
        }
    }

    /// Whether this error came from the underlying byte source
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid configuration file: {}", error),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(error: rayon::ThreadPoolBuildError) -> Self {
        Self::Configuration {
            message: format!("Failed to build worker pool: {}", error),
        }
    }
}
