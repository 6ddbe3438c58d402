//! Line-level mapping results and the field errors they aggregate

use std::fmt;

use thiserror::Error;

/// Why a single field could not be mapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// The converter rejected the raw text
    InvalidValue,
    /// The line has fewer tokens than the mapped index requires
    MissingColumn,
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue => write!(f, "invalid value"),
            Self::MissingColumn => write!(f, "missing column"),
        }
    }
}

/// One field that failed to convert
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at column {index} ({target_type}){}", raw_suffix(.raw_value))]
pub struct FieldError {
    /// Token index the mapping entry is bound to
    pub index: usize,
    /// Raw token text, absent for missing columns
    pub raw_value: Option<String>,
    /// Name of the type the converter produces
    pub target_type: &'static str,
    pub kind: FieldErrorKind,
}

fn raw_suffix(raw: &Option<String>) -> String {
    match raw {
        Some(value) => format!(": {:?}", value),
        None => String::new(),
    }
}

impl FieldError {
    pub fn invalid_value(index: usize, raw_value: &str, target_type: &'static str) -> Self {
        Self {
            index,
            raw_value: Some(raw_value.to_string()),
            target_type,
            kind: FieldErrorKind::InvalidValue,
        }
    }

    pub fn missing_column(index: usize, target_type: &'static str) -> Self {
        Self {
            index,
            raw_value: None,
            target_type,
            kind: FieldErrorKind::MissingColumn,
        }
    }
}

/// All field errors raised by one line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_number}: {} field error(s): {}", .field_errors.len(), join_errors(.field_errors))]
pub struct LineError {
    /// 0-based position of the line in the source
    pub line_number: usize,
    pub field_errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LineError {
    pub fn new(line_number: usize, field_errors: Vec<FieldError>) -> Self {
        Self {
            line_number,
            field_errors,
        }
    }
}

/// Outcome of mapping one line
#[derive(Debug, Clone, PartialEq)]
pub struct MappingResult<T> {
    /// 0-based position of the line in the source, counting filtered lines
    pub line_number: usize,
    pub result: Result<T, LineError>,
}

impl<T> MappingResult<T> {
    pub fn success(line_number: usize, record: T) -> Self {
        Self {
            line_number,
            result: Ok(record),
        }
    }

    pub fn failure(line_number: usize, field_errors: Vec<FieldError>) -> Self {
        Self {
            line_number,
            result: Err(LineError::new(line_number, field_errors)),
        }
    }

    /// Whether every mapped field converted
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&LineError> {
        self.result.as_ref().err()
    }

    /// Take the record, dropping the error if there was one
    pub fn into_record(self) -> Option<T> {
        self.result.ok()
    }

    pub fn into_result(self) -> Result<T, LineError> {
        self.result
    }
}
