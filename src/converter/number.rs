//! Numeric converters
//!
//! One generic [`NumberConverter`] covers every primitive integer, both float
//! widths and [`rust_decimal::Decimal`]. Parsing is configured with two
//! independent knobs:
//!
//! - [`NumberFormat`] - which characters act as decimal and group separators
//! - [`NumberStyles`] - which syntaxes are accepted (sign, thousands, exponent, ...)
//!
//! Input is normalized to Rust's invariant syntax first and then handed to the
//! standard `FromStr` implementation of the target type. Only ASCII digits,
//! signs, exponent markers and the configured separators are ever accepted.
//! Float results that are NaN or infinite are rejected even when the text
//! parsed. Unsigned targets accept a negative zero such as `-0`.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::{DefaultConverter, TypeConverter, non_blank};

/// Decimal and group separator characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: char,
}

impl NumberFormat {
    /// `1,234.5`
    pub const INVARIANT: Self = Self {
        decimal_separator: '.',
        group_separator: ',',
    };

    /// `1.234,5`
    pub const COMMA_DECIMAL: Self = Self {
        decimal_separator: ',',
        group_separator: '.',
    };

    pub fn new(decimal_separator: char, group_separator: char) -> Self {
        Self {
            decimal_separator,
            group_separator,
        }
    }

    fn is_invariant(&self) -> bool {
        self.decimal_separator == '.'
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::INVARIANT
    }
}

/// Numeric syntaxes a converter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberStyles {
    pub allow_leading_white: bool,
    pub allow_trailing_white: bool,
    pub allow_leading_sign: bool,
    pub allow_thousands: bool,
    pub allow_decimal_point: bool,
    pub allow_exponent: bool,
}

impl NumberStyles {
    /// Surrounding whitespace and a leading sign only
    pub const INTEGER: Self = Self {
        allow_leading_white: true,
        allow_trailing_white: true,
        allow_leading_sign: true,
        allow_thousands: false,
        allow_decimal_point: false,
        allow_exponent: false,
    };

    /// Integer syntax plus decimal point and exponent
    pub const FLOAT: Self = Self {
        allow_decimal_point: true,
        allow_exponent: true,
        ..Self::INTEGER
    };

    /// Integer syntax plus decimal point and thousands separators
    pub const NUMBER: Self = Self {
        allow_decimal_point: true,
        allow_thousands: true,
        ..Self::INTEGER
    };

    /// Everything
    pub const ANY: Self = Self {
        allow_leading_white: true,
        allow_trailing_white: true,
        allow_leading_sign: true,
        allow_thousands: true,
        allow_decimal_point: true,
        allow_exponent: true,
    };

    /// Nothing but digits
    pub const NONE: Self = Self {
        allow_leading_white: false,
        allow_trailing_white: false,
        allow_leading_sign: false,
        allow_thousands: false,
        allow_decimal_point: false,
        allow_exponent: false,
    };

    pub fn with_thousands(mut self, allow: bool) -> Self {
        self.allow_thousands = allow;
        self
    }

    pub fn with_leading_sign(mut self, allow: bool) -> Self {
        self.allow_leading_sign = allow;
        self
    }

    pub fn with_whitespace(mut self, allow: bool) -> Self {
        self.allow_leading_white = allow;
        self.allow_trailing_white = allow;
        self
    }
}

/// Rewrite `value` into Rust's invariant numeric syntax, or reject it
fn normalize<'a>(value: &'a str, format: NumberFormat, styles: NumberStyles) -> Option<Cow<'a, str>> {
    let mut text = value;

    if styles.allow_leading_white {
        text = text.trim_start();
    } else if text.starts_with(char::is_whitespace) {
        return None;
    }
    if styles.allow_trailing_white {
        text = text.trim_end();
    } else if text.ends_with(char::is_whitespace) {
        return None;
    }
    if text.is_empty() {
        return None;
    }

    let allowed = |c: char| {
        c.is_ascii_digit()
            || matches!(c, '+' | '-' | 'e' | 'E' | '.')
            || c == format.decimal_separator
            || c == format.group_separator
    };
    if !text.chars().all(allowed) {
        return None;
    }

    if !styles.allow_leading_sign && text.starts_with(['+', '-']) {
        return None;
    }
    if !styles.allow_exponent && text.contains(['e', 'E']) {
        return None;
    }

    let has_decimal = text.contains(format.decimal_separator);
    let has_group = text.contains(format.group_separator);

    if has_decimal && !styles.allow_decimal_point {
        return None;
    }
    if has_group && !styles.allow_thousands {
        return None;
    }
    if !has_group && format.is_invariant() {
        return Some(Cow::Borrowed(text));
    }

    let mut normalized = String::with_capacity(text.len());
    let mut seen_decimal = false;
    for c in text.chars() {
        if c == format.group_separator {
            // Group separators only belong to the integral part
            if seen_decimal {
                return None;
            }
        } else if c == format.decimal_separator {
            seen_decimal = true;
            normalized.push('.');
        } else if c == '.' {
            return None;
        } else {
            normalized.push(c);
        }
    }

    Some(Cow::Owned(normalized))
}

/// Numeric types a [`NumberConverter`] can produce
pub trait Numeric: Sized + Send + Sync + 'static {
    /// Styles used when a converter is built without explicit styles
    const DEFAULT_STYLES: NumberStyles;

    /// Parse text already normalized to invariant syntax
    fn parse_normalized(text: &str) -> Option<Self>;
}

/// `-0`, `-00`, ... which unsigned `FromStr` refuses
fn is_negative_zero(text: &str) -> bool {
    text.strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b == b'0'))
}

macro_rules! impl_numeric_integer {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Numeric for $ty {
                const DEFAULT_STYLES: NumberStyles = NumberStyles::INTEGER;

                fn parse_normalized(text: &str) -> Option<Self> {
                    match text.parse() {
                        Ok(value) => Some(value),
                        Err(_) => is_negative_zero(text).then_some(0),
                    }
                }
            }
        )+
    };
}

macro_rules! impl_numeric_float {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Numeric for $ty {
                const DEFAULT_STYLES: NumberStyles = NumberStyles::ANY;

                fn parse_normalized(text: &str) -> Option<Self> {
                    text.parse::<$ty>().ok().filter(|v| v.is_finite())
                }
            }
        )+
    };
}

impl_numeric_integer!(i8, u8, i16, u16, i32, u32, i64, u64);
impl_numeric_float!(f32, f64);

impl Numeric for Decimal {
    const DEFAULT_STYLES: NumberStyles = NumberStyles::NUMBER;

    fn parse_normalized(text: &str) -> Option<Self> {
        if text.contains(['e', 'E']) {
            Decimal::from_scientific(text).ok()
        } else {
            Decimal::from_str(text).ok()
        }
    }
}

/// Converter for any [`Numeric`] type
pub struct NumberConverter<T> {
    format: NumberFormat,
    styles: NumberStyles,
    _target: PhantomData<fn() -> T>,
}

pub type SByteConverter = NumberConverter<i8>;
pub type ByteConverter = NumberConverter<u8>;
pub type Int16Converter = NumberConverter<i16>;
pub type UInt16Converter = NumberConverter<u16>;
pub type Int32Converter = NumberConverter<i32>;
pub type UInt32Converter = NumberConverter<u32>;
pub type Int64Converter = NumberConverter<i64>;
pub type UInt64Converter = NumberConverter<u64>;
pub type SingleConverter = NumberConverter<f32>;
pub type DoubleConverter = NumberConverter<f64>;
pub type DecimalConverter = NumberConverter<Decimal>;

impl<T: Numeric> NumberConverter<T> {
    /// Invariant format with the type's default styles
    pub fn new() -> Self {
        Self::with_format_and_styles(NumberFormat::INVARIANT, T::DEFAULT_STYLES)
    }

    pub fn with_format(format: NumberFormat) -> Self {
        Self::with_format_and_styles(format, T::DEFAULT_STYLES)
    }

    pub fn with_styles(styles: NumberStyles) -> Self {
        Self::with_format_and_styles(NumberFormat::INVARIANT, styles)
    }

    pub fn with_format_and_styles(format: NumberFormat, styles: NumberStyles) -> Self {
        Self {
            format,
            styles,
            _target: PhantomData,
        }
    }

    pub fn format(&self) -> NumberFormat {
        self.format
    }

    pub fn styles(&self) -> NumberStyles {
        self.styles
    }
}

impl<T: Numeric> Default for NumberConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for NumberConverter<T> {
    fn clone(&self) -> Self {
        Self {
            format: self.format,
            styles: self.styles,
            _target: PhantomData,
        }
    }
}

impl<T> fmt::Debug for NumberConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberConverter")
            .field("target", &std::any::type_name::<T>())
            .field("format", &self.format)
            .field("styles", &self.styles)
            .finish()
    }
}

impl<T: Numeric> TypeConverter for NumberConverter<T> {
    type Output = T;

    fn try_convert(&self, value: &str) -> Option<T> {
        let value = non_blank(value)?;
        let normalized = normalize(value, self.format, self.styles)?;
        T::parse_normalized(&normalized)
    }
}

macro_rules! impl_default_number_converter {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl DefaultConverter for $ty {
                type Converter = NumberConverter<$ty>;

                fn default_converter() -> Self::Converter {
                    NumberConverter::new()
                }
            }
        )+
    };
}

impl_default_number_converter!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, Decimal);
