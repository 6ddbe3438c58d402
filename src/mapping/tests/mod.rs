//! Mapping engine test fixtures

use chrono::NaiveDate;
use std::borrow::Cow;

use crate::converter::{DateConverter, Int32Converter, Nullable};
use crate::mapping::CsvMapping;


/// Record shaped like one row of an airport weather observation file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherRecord {
    pub station: String,
    pub date: Option<NaiveDate>,
    pub temperature: i32,
    pub wind_speed: Option<i32>,
    pub sky: String,
}

/// Station, date, temperature, wind speed and sky condition
pub fn weather_mapping() -> CsvMapping<WeatherRecord> {
    CsvMapping::new()
        .map_property(0, |r: &mut WeatherRecord, v: String| r.station = v)
        .map_property_with(1, DateConverter::with_format("%Y%m%d"), |r, v| {
            r.date = Some(v)
        })
        .map_property_with(2, Int32Converter::new(), |r, v| r.temperature = v)
        .map_property_with(3, Nullable::new(Int32Converter::new()), |r, v| {
            r.wind_speed = v
        })
        .map_property(4, |r: &mut WeatherRecord, v: String| r.sky = v)
}

/// Borrowed tokens for a slice of literals
pub fn tokens<'a>(values: &[&'a str]) -> Vec<Cow<'a, str>> {
    values.iter().map(|v| Cow::Borrowed(*v)).collect()
}
