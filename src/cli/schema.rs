//! Column declarations for the validate command
//!
//! A column is declared on the command line as `INDEX:TYPE[?][:FORMAT]`, for
//! example `0:string`, `1:date:%Y%m%d` or `4:float?`. A trailing `?` on the
//! type makes blank fields valid. The declarations are turned into a
//! [`CsvMapping`] over a dynamically typed [`Row`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::converter::{
    BoolConverter, CharConverter, DateConverter, DateTimeConverter, DecimalConverter,
    DoubleConverter, DurationConverter, Int64Converter, Nullable, StringConverter, TimeConverter,
    TypeConverter, UuidConverter, UuidLayout,
};
use crate::mapping::CsvMapping;
use crate::{Error, Result};

/// Target type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Char,
    Int,
    Float,
    Decimal,
    Bool,
    Date,
    DateTime,
    Time,
    Duration,
    Uuid,
}

impl ColumnType {
    pub const NAMES: &'static [&'static str] = &[
        "string", "char", "int", "float", "decimal", "bool", "date", "datetime", "time",
        "duration", "uuid",
    ];

    /// Whether a `:FORMAT` suffix means anything for this type
    pub fn takes_format(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Date | Self::DateTime | Self::Time | Self::Uuid
        )
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(Self::String),
            "char" => Ok(Self::Char),
            "int" | "integer" => Ok(Self::Int),
            "float" | "double" => Ok(Self::Float),
            "decimal" => Ok(Self::Decimal),
            "bool" | "boolean" => Ok(Self::Bool),
            "date" => Ok(Self::Date),
            "datetime" => Ok(Self::DateTime),
            "time" => Ok(Self::Time),
            "duration" => Ok(Self::Duration),
            "uuid" => Ok(Self::Uuid),
            other => Err(Error::configuration(format!(
                "Unknown column type '{}'. Available types: {}",
                other,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::Uuid => "uuid",
        };
        write!(f, "{}", name)
    }
}

/// One `INDEX:TYPE[?][:FORMAT]` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub index: usize,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub format: Option<String>,
}

impl FromStr for ColumnSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let index = parts.next().unwrap_or_default().trim();
        let Some(type_name) = parts.next().map(str::trim) else {
            return Err(Error::configuration(format!(
                "Column '{}' must look like INDEX:TYPE[?][:FORMAT]",
                s
            )));
        };
        let format = parts.next().filter(|f| !f.is_empty()).map(str::to_string);

        let index = index.parse::<usize>().map_err(|_| {
            Error::configuration(format!("Column index '{}' is not a number", index))
        })?;
        let (type_name, nullable) = match type_name.strip_suffix('?') {
            Some(name) => (name, true),
            None => (type_name, false),
        };
        let column_type = type_name.parse::<ColumnType>()?;

        if format.is_some() && !column_type.takes_format() {
            return Err(Error::configuration(format!(
                "Column type {} takes no format",
                column_type
            )));
        }

        Ok(Self {
            index,
            column_type,
            nullable,
            format,
        })
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.column_type)?;
        if self.nullable {
            write!(f, "?")?;
        }
        if let Some(format) = &self.format {
            write!(f, ":{}", format)?;
        }
        Ok(())
    }
}

/// A converted field of a [`Row`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Char(char),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Duration(TimeDelta),
    Uuid(Uuid),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::Duration(v) => write!(f, "{}", v),
            Self::Uuid(v) => write!(f, "{}", v),
        }
    }
}

/// Record produced by a declared schema; one slot per declared column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Option<Value>>,
}

impl Row {
    /// Value of the `slot`-th declared column, `None` when blank or unset
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot).and_then(Option::as_ref)
    }

    pub fn values(&self) -> &[Option<Value>] {
        &self.values
    }

    fn set(&mut self, slot: usize, value: Option<Value>) {
        if self.values.len() <= slot {
            self.values.resize(slot + 1, None);
        }
        self.values[slot] = value;
    }
}

/// Build a mapping with one entry per declaration, in declaration order
pub fn build_mapping(columns: &[ColumnSpec]) -> Result<CsvMapping<Row>> {
    if columns.is_empty() {
        return Err(Error::configuration("At least one column must be declared"));
    }

    let mut mapping = CsvMapping::new();
    for (slot, column) in columns.iter().enumerate() {
        let format = column.format.as_deref();
        mapping = match column.column_type {
            ColumnType::String => bind(mapping, column, slot, StringConverter::new(), Value::String),
            ColumnType::Char => bind(mapping, column, slot, CharConverter::new(), Value::Char),
            ColumnType::Int => bind(mapping, column, slot, Int64Converter::new(), Value::Int),
            ColumnType::Float => bind(mapping, column, slot, DoubleConverter::new(), Value::Float),
            ColumnType::Decimal => {
                bind(mapping, column, slot, DecimalConverter::new(), Value::Decimal)
            }
            ColumnType::Bool => bind(mapping, column, slot, bool_converter(format)?, Value::Bool),
            ColumnType::Date => {
                let converter = format.map_or_else(DateConverter::new, DateConverter::with_format);
                bind(mapping, column, slot, converter, Value::Date)
            }
            ColumnType::DateTime => {
                let converter =
                    format.map_or_else(DateTimeConverter::new, DateTimeConverter::with_format);
                bind(mapping, column, slot, converter, Value::DateTime)
            }
            ColumnType::Time => {
                let converter = format.map_or_else(TimeConverter::new, TimeConverter::with_format);
                bind(mapping, column, slot, converter, Value::Time)
            }
            ColumnType::Duration => {
                bind(mapping, column, slot, DurationConverter::new(), Value::Duration)
            }
            ColumnType::Uuid => bind(mapping, column, slot, uuid_converter(format)?, Value::Uuid),
        };
    }
    Ok(mapping)
}

fn bind<C>(
    mapping: CsvMapping<Row>,
    column: &ColumnSpec,
    slot: usize,
    converter: C,
    wrap: fn(C::Output) -> Value,
) -> CsvMapping<Row>
where
    C: TypeConverter + 'static,
{
    if column.nullable {
        mapping.map_property_with(
            column.index,
            Nullable::new(converter),
            move |row: &mut Row, value: Option<C::Output>| row.set(slot, value.map(wrap)),
        )
    } else {
        mapping.map_property_with(column.index, converter, move |row: &mut Row, value| {
            row.set(slot, Some(wrap(value)))
        })
    }
}

/// `TRUE/FALSE` literals, matched case-insensitively
fn bool_converter(format: Option<&str>) -> Result<BoolConverter> {
    let Some(format) = format else {
        return Ok(BoolConverter::new());
    };
    match format.split_once('/') {
        Some((yes, no)) if !yes.is_empty() && !no.is_empty() && yes != no => {
            Ok(BoolConverter::with_literals(yes, no, false))
        }
        _ => Err(Error::configuration(format!(
            "Bool format '{}' must look like TRUE/FALSE",
            format
        ))),
    }
}

fn uuid_converter(format: Option<&str>) -> Result<UuidConverter> {
    let layout = match format {
        None => return Ok(UuidConverter::new()),
        Some("hyphenated") => UuidLayout::Hyphenated,
        Some("simple") => UuidLayout::Simple,
        Some("braced") => UuidLayout::Braced,
        Some("urn") => UuidLayout::Urn,
        Some(other) => {
            return Err(Error::configuration(format!(
                "Unknown UUID layout '{}'. Available layouts: hyphenated, simple, braced, urn",
                other
            )));
        }
    };
    Ok(UuidConverter::with_layout(layout))
}
