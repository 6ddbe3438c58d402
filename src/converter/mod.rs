//! Type converters from raw field text to typed values
//!
//! Every converter implements [`TypeConverter`]: a pure function from text to
//! `Option<Output>`. A failed conversion is `None`, never a panic, so the
//! mapping engine can record the failure and keep going.
//!
//! Non-nullable converters reject empty and whitespace-only input. Wrapping a
//! converter in [`Nullable`] turns those inputs (and absent values) into a
//! successful `None`.
//!
//! ## Modules
//!
//! - [`number`] - integers, floats and decimals with format/style knobs
//! - [`boolean`] - configurable true/false literals
//! - [`enumeration`] - named variants with optional case folding
//! - [`temporal`] - dates, date-times, times of day and durations (chrono)
//! - [`text`] - strings, single characters and UUIDs

pub mod boolean;
pub mod enumeration;
pub mod number;
pub mod temporal;
pub mod text;

#[cfg(test)]
pub mod tests;

pub use boolean::BoolConverter;
pub use enumeration::{CsvEnum, EnumConverter};
pub use number::{
    ByteConverter, DecimalConverter, DoubleConverter, Int16Converter, Int32Converter,
    Int64Converter, NumberConverter, NumberFormat, NumberStyles, Numeric, SByteConverter,
    SingleConverter, UInt16Converter, UInt32Converter, UInt64Converter,
};
pub use temporal::{DateConverter, DateTimeConverter, DateTimeStyles, DurationConverter, TimeConverter};
pub use text::{CharConverter, StringConverter, UuidConverter, UuidLayout};

/// Converts raw field text into a typed value
pub trait TypeConverter: Send + Sync {
    /// Value produced on success
    type Output;

    /// Convert `value`, returning `None` when it is not acceptable
    fn try_convert(&self, value: &str) -> Option<Self::Output>;

    /// Convert a value that may be absent altogether
    fn try_convert_opt(&self, value: Option<&str>) -> Option<Self::Output> {
        value.and_then(|v| self.try_convert(v))
    }

    /// Name of the produced type, used in field error reports
    fn target_type(&self) -> &'static str {
        std::any::type_name::<Self::Output>()
    }
}

/// Accepts blank and absent input as `None`, delegating everything else
#[derive(Debug, Clone, Default)]
pub struct Nullable<C> {
    inner: C,
}

impl<C: TypeConverter> Nullable<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: TypeConverter> TypeConverter for Nullable<C> {
    type Output = Option<C::Output>;

    fn try_convert(&self, value: &str) -> Option<Self::Output> {
        if value.trim().is_empty() {
            return Some(None);
        }
        self.inner.try_convert(value).map(Some)
    }

    fn try_convert_opt(&self, value: Option<&str>) -> Option<Self::Output> {
        match value {
            Some(v) => self.try_convert(v),
            None => Some(None),
        }
    }
}

/// Types that have a converter to use when a mapping does not name one
pub trait DefaultConverter: Sized {
    type Converter: TypeConverter<Output = Self> + 'static;

    fn default_converter() -> Self::Converter;
}

impl<T: DefaultConverter> DefaultConverter for Option<T> {
    type Converter = Nullable<T::Converter>;

    fn default_converter() -> Self::Converter {
        Nullable::new(T::default_converter())
    }
}

/// Reject empty and whitespace-only input for non-nullable converters
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Case-insensitive comparison without allocating
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
