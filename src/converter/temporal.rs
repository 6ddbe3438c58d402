//! Date and time converters backed by chrono
//!
//! Each converter takes an optional chrono format string. Without one, a
//! short list of common layouts is tried in order (see
//! [`crate::constants::DEFAULT_DATE_FORMATS`] and friends), the same way the
//! field parsers accept timestamps with and without a zone suffix.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::{DefaultConverter, TypeConverter, non_blank};
use crate::constants::{DEFAULT_DATE_FORMATS, DEFAULT_DATETIME_FORMATS, DEFAULT_TIME_FORMATS};

/// Parse strictness for temporal converters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeStyles {
    /// Trim whitespace around the value before parsing
    pub allow_surrounding_whitespace: bool,
    /// Let a date-time converter accept a bare date as midnight
    pub allow_date_only: bool,
}

impl DateTimeStyles {
    /// Exact match of the value against the format
    pub const STRICT: Self = Self {
        allow_surrounding_whitespace: false,
        allow_date_only: false,
    };

    pub const LENIENT: Self = Self {
        allow_surrounding_whitespace: true,
        allow_date_only: true,
    };
}

impl Default for DateTimeStyles {
    fn default() -> Self {
        Self::LENIENT
    }
}

fn prepare(value: &str, styles: DateTimeStyles) -> Option<&str> {
    let value = non_blank(value)?;
    if styles.allow_surrounding_whitespace {
        Some(value.trim())
    } else {
        Some(value)
    }
}

/// Try an explicit format, or each default format in turn
fn parse_with<T>(
    value: &str,
    format: Option<&str>,
    defaults: &[&str],
    parse: impl Fn(&str, &str) -> Option<T>,
) -> Option<T> {
    match format {
        Some(fmt) => parse(value, fmt),
        None => defaults.iter().find_map(|fmt| parse(value, fmt)),
    }
}

/// Converter for calendar dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateConverter {
    format: Option<String>,
    styles: DateTimeStyles,
}

impl DateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse with one chrono format, e.g. `"%Y%m%d"`
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            styles: DateTimeStyles::default(),
        }
    }

    pub fn with_styles(mut self, styles: DateTimeStyles) -> Self {
        self.styles = styles;
        self
    }
}

impl TypeConverter for DateConverter {
    type Output = NaiveDate;

    fn try_convert(&self, value: &str) -> Option<NaiveDate> {
        let value = prepare(value, self.styles)?;
        parse_with(value, self.format.as_deref(), DEFAULT_DATE_FORMATS, |v, f| {
            NaiveDate::parse_from_str(v, f).ok()
        })
    }
}

/// Converter for timestamps without a zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeConverter {
    format: Option<String>,
    styles: DateTimeStyles,
}

impl DateTimeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            styles: DateTimeStyles::default(),
        }
    }

    pub fn with_styles(mut self, styles: DateTimeStyles) -> Self {
        self.styles = styles;
        self
    }
}

impl TypeConverter for DateTimeConverter {
    type Output = NaiveDateTime;

    fn try_convert(&self, value: &str) -> Option<NaiveDateTime> {
        let value = prepare(value, self.styles)?;
        let format = self.format.as_deref();

        let parsed = parse_with(value, format, DEFAULT_DATETIME_FORMATS, |v, f| {
            NaiveDateTime::parse_from_str(v, f).ok()
        });
        if parsed.is_some() || !self.styles.allow_date_only {
            return parsed;
        }

        parse_with(value, format, DEFAULT_DATE_FORMATS, |v, f| {
            NaiveDate::parse_from_str(v, f).ok()
        })
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// Converter for times of day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeConverter {
    format: Option<String>,
    styles: DateTimeStyles,
}

impl TimeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            styles: DateTimeStyles::default(),
        }
    }

    pub fn with_styles(mut self, styles: DateTimeStyles) -> Self {
        self.styles = styles;
        self
    }
}

impl TypeConverter for TimeConverter {
    type Output = NaiveTime;

    fn try_convert(&self, value: &str) -> Option<NaiveTime> {
        let value = prepare(value, self.styles)?;
        parse_with(value, self.format.as_deref(), DEFAULT_TIME_FORMATS, |v, f| {
            NaiveTime::parse_from_str(v, f).ok()
        })
    }
}

/// Converter for durations written as `[-]d`, `[-][d.]h:m[:s[.fraction]]`
///
/// A bare integer counts days; `1:2:3` is one hour, two minutes, three seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationConverter {
    styles: DateTimeStyles,
}

impl DurationConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_styles(mut self, styles: DateTimeStyles) -> Self {
        self.styles = styles;
        self
    }
}

const SECONDS_PER_DAY: i64 = 86_400;

fn parse_component(text: &str, max: Option<i64>) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = text.parse().ok()?;
    match max {
        Some(max) if value >= max => None,
        _ => Some(value),
    }
}

/// Fraction digits after the seconds dot, as nanoseconds
fn parse_fraction(text: &str) -> Option<u32> {
    if text.is_empty() || text.len() > 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: u32 = text.parse().ok()?;
    Some(digits * 10u32.pow(9 - text.len() as u32))
}

fn parse_duration(value: &str) -> Option<TimeDelta> {
    let (negative, body) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value),
    };

    let (total_seconds, nanos) = if !body.contains(':') {
        let days = parse_component(body, None)?;
        (days.checked_mul(SECONDS_PER_DAY)?, 0)
    } else {
        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() > 3 {
            return None;
        }

        let (days, hours) = match parts[0].split_once('.') {
            Some((d, h)) => (parse_component(d, None)?, parse_component(h, Some(24))?),
            None => (0, parse_component(parts[0], Some(24))?),
        };
        let minutes = parse_component(parts[1], Some(60))?;
        let (seconds, nanos) = match parts.get(2) {
            None => (0, 0),
            Some(sec) => match sec.split_once('.') {
                Some((s, frac)) => (parse_component(s, Some(60))?, parse_fraction(frac)?),
                None => (parse_component(sec, Some(60))?, 0),
            },
        };

        let total = days
            .checked_mul(SECONDS_PER_DAY)?
            .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
        (total, nanos)
    };

    let delta = TimeDelta::new(total_seconds, nanos)?;
    Some(if negative { -delta } else { delta })
}

impl TypeConverter for DurationConverter {
    type Output = TimeDelta;

    fn try_convert(&self, value: &str) -> Option<TimeDelta> {
        let value = prepare(value, self.styles)?;
        parse_duration(value)
    }
}

impl DefaultConverter for NaiveDate {
    type Converter = DateConverter;

    fn default_converter() -> Self::Converter {
        DateConverter::new()
    }
}

impl DefaultConverter for NaiveDateTime {
    type Converter = DateTimeConverter;

    fn default_converter() -> Self::Converter {
        DateTimeConverter::new()
    }
}

impl DefaultConverter for NaiveTime {
    type Converter = TimeConverter;

    fn default_converter() -> Self::Converter {
        TimeConverter::new()
    }
}

impl DefaultConverter for TimeDelta {
    type Converter = DurationConverter;

    fn default_converter() -> Self::Converter {
        DurationConverter::new()
    }
}
