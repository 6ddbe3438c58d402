//! Field mapping table and mapping engine
//!
//! A [`CsvMapping`] binds token indices to a converter and a setter closure.
//! The closures are built once, when the mapping is declared, so applying the
//! table to a line is a straight walk over the entries with no lookups.
//!
//! Mapping never stops at the first bad field: every entry is applied and all
//! failures are collected into one [`LineError`].
//!
//! ```ignore
//! let mapping = CsvMapping::<Observation>::new()
//!     .map_property(0, |o: &mut Observation, v: String| o.station = v)
//!     .map_property_with(1, DateConverter::with_format("%Y%m%d"), |o, v| o.date = v);
//! ```

pub mod result;

#[cfg(test)]
pub mod tests;

use std::borrow::Cow;
use std::fmt;

use smallvec::SmallVec;

use crate::converter::{DefaultConverter, TypeConverter};
use crate::tokenizer::Tokens;

pub use result::{FieldError, FieldErrorKind, LineError, MappingResult};

/// Inline storage for the tokens of one line
pub type TokenBuffer<'a> = SmallVec<[Cow<'a, str>; 16]>;

type ApplyFn<T> = dyn Fn(&mut T, &str) -> bool + Send + Sync;

/// One binding of a token index to a converter and a setter
pub struct FieldMapping<T> {
    index: usize,
    target_type: &'static str,
    apply: Box<ApplyFn<T>>,
}

impl<T> FieldMapping<T> {
    fn new<C, F>(index: usize, converter: C, setter: F) -> Self
    where
        C: TypeConverter + 'static,
        F: Fn(&mut T, C::Output) + Send + Sync + 'static,
        T: 'static,
    {
        let target_type = converter.target_type();
        let apply = move |record: &mut T, raw: &str| match converter.try_convert(raw) {
            Some(value) => {
                setter(record, value);
                true
            }
            None => false,
        };

        Self {
            index,
            target_type,
            apply: Box::new(apply),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target_type(&self) -> &'static str {
        self.target_type
    }
}

impl<T> fmt::Debug for FieldMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapping")
            .field("index", &self.index)
            .field("target_type", &self.target_type)
            .finish()
    }
}

/// Ordered mapping table for one record type
pub struct CsvMapping<T> {
    entries: Vec<FieldMapping<T>>,
}

impl<T: Default + 'static> CsvMapping<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind `index` using the default converter of the setter's value type
    pub fn map_property<V, F>(self, index: usize, setter: F) -> Self
    where
        V: DefaultConverter,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.map_property_with(index, V::default_converter(), setter)
    }

    /// Bind `index` using an explicit converter
    pub fn map_property_with<C, F>(mut self, index: usize, converter: C, setter: F) -> Self
    where
        C: TypeConverter + 'static,
        F: Fn(&mut T, C::Output) + Send + Sync + 'static,
    {
        self.entries.push(FieldMapping::new(index, converter, setter));
        self
    }

    /// Apply the table to already collected tokens
    ///
    /// Entries bound to the same index all apply, in registration order.
    pub fn map(&self, tokens: &[Cow<'_, str>], line_number: usize) -> MappingResult<T> {
        let mut record = T::default();
        let mut errors = Vec::new();

        for entry in &self.entries {
            match tokens.get(entry.index) {
                None => errors.push(FieldError::missing_column(entry.index, entry.target_type)),
                Some(raw) => {
                    let raw: &str = raw;
                    if !(entry.apply)(&mut record, raw) {
                        errors.push(FieldError::invalid_value(entry.index, raw, entry.target_type));
                    }
                }
            }
        }

        if errors.is_empty() {
            MappingResult::success(line_number, record)
        } else {
            MappingResult::failure(line_number, errors)
        }
    }

    /// Collect a lazy token sequence and apply the table
    ///
    /// Tokens past the highest mapped index are never materialized.
    pub fn map_tokens(&self, tokens: Tokens<'_>, line_number: usize) -> MappingResult<T> {
        let needed = self.max_index().map_or(0, |max| max + 1);
        let buffer: TokenBuffer<'_> = tokens.take(needed).collect();
        self.map(&buffer, line_number)
    }
}

impl<T> CsvMapping<T> {
    /// Highest token index referenced by the table
    pub fn max_index(&self) -> Option<usize> {
        self.entries.iter().map(|e| e.index).max()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FieldMapping<T>] {
        &self.entries
    }
}

impl<T: Default + 'static> Default for CsvMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CsvMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvMapping")
            .field("entries", &self.entries)
            .finish()
    }
}
