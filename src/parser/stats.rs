//! Parse statistics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::MappingResult;

/// Counters for one parse run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Lines read from the source, filtered ones included
    pub lines_scanned: usize,

    /// Header, blank and comment lines that never reached the tokenizer
    pub lines_filtered: usize,

    /// Lines mapped into a record
    pub records_parsed: usize,

    /// Lines with at least one field error
    pub lines_failed: usize,

    /// Whether the run stopped on a cancellation signal
    pub cancelled: bool,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one mapping outcome
    pub fn record<T>(&mut self, result: &MappingResult<T>) {
        if result.is_valid() {
            self.records_parsed += 1;
        } else {
            self.lines_failed += 1;
        }
    }

    /// Lines that were tokenized and mapped
    pub fn lines_mapped(&self) -> usize {
        self.records_parsed + self.lines_failed
    }

    /// Calculate success rate as a percentage of mapped lines
    pub fn success_rate(&self) -> f64 {
        if self.lines_mapped() == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / self.lines_mapped() as f64) * 100.0
        }
    }

    /// Whether every mapped line produced a record
    pub fn is_clean(&self) -> bool {
        self.lines_failed == 0
    }
}

impl fmt::Display for ParseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines scanned, {} filtered, {} parsed, {} failed ({:.1}% success)",
            self.lines_scanned,
            self.lines_filtered,
            self.records_parsed,
            self.lines_failed,
            self.success_rate()
        )
    }
}
