//! Parser test fixtures

use chrono::NaiveDate;

use crate::config::CsvParserOptions;
use crate::converter::{DateConverter, DoubleConverter, Nullable};
use crate::mapping::{CsvMapping, MappingResult};
use crate::parser::CsvParser;


/// Hourly airport observation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub station: String,
    pub date: Option<NaiveDate>,
    pub temperature: Option<f64>,
    pub sky: String,
}

pub fn observation_mapping() -> CsvMapping<Observation> {
    CsvMapping::new()
        .map_property(0, |o: &mut Observation, v: String| o.station = v)
        .map_property_with(1, DateConverter::with_format("%Y%m%d"), |o, v| {
            o.date = Some(v)
        })
        .map_property_with(2, Nullable::new(DoubleConverter::new()), |o, v| {
            o.temperature = v
        })
        .map_property(3, |o: &mut Observation, v: String| o.sky = v)
}

pub fn sequential_parser(skip_header: bool) -> CsvParser<Observation> {
    CsvParser::new(
        CsvParserOptions::with_header(skip_header, "#").sequential(),
        observation_mapping(),
    )
    .unwrap()
}

pub fn parallel_parser(workers: usize, keep_order: bool) -> CsvParser<Observation> {
    CsvParser::new(
        CsvParserOptions::with_header(true, "#")
            .with_degree_of_parallelism(workers)
            .with_keep_order(keep_order)
            .with_window_per_worker(3),
        observation_mapping(),
    )
    .unwrap()
}

/// Header, comment, blank line, `rows` data lines with every fifth one broken
pub fn sample_csv(rows: usize) -> String {
    let mut text = String::from("station,date,temp,sky\n# exported by the tower\n\n");
    for i in 0..rows {
        if i % 5 == 4 {
            text.push_str(&format!("K{:03},20150301,warm,CLR\n", i));
        } else {
            text.push_str(&format!("K{:03},20150301,{}.5,OVC\n", i, i));
        }
    }
    text
}

/// Line numbers and validity, for comparing runs
pub fn outline(results: &[MappingResult<Observation>]) -> Vec<(usize, bool)> {
    results.iter().map(|r| (r.line_number, r.is_valid())).collect()
}
