//! End-to-end tests for file parsing through the public API
//!
//! Every pipeline mode reads the same generated file and must agree on line
//! numbers, records and counters.

use chrono::NaiveDate;
use csvmap::constants::MIN_CHUNK_SIZE;
use csvmap::converter::{DateConverter, DoubleConverter, Int32Converter, Nullable};
use csvmap::{
    CsvMapping, CsvParser, CsvParserOptions, FieldErrorKind, MappingResult, ParserConfig,
    RecordStreamExt, Rfc4180Tokenizer,
};
use futures::TryStreamExt;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq)]
struct Metar {
    station: String,
    date: Option<NaiveDate>,
    visibility: i32,
    temperature: Option<f64>,
    sky: String,
}

fn metar_mapping() -> CsvMapping<Metar> {
    CsvMapping::new()
        .map_property(0, |m: &mut Metar, v: String| m.station = v)
        .map_property_with(1, DateConverter::with_format("%Y%m%d"), |m, v| {
            m.date = Some(v)
        })
        .map_property_with(2, Int32Converter::new(), |m, v| m.visibility = v)
        .map_property_with(3, Nullable::new(DoubleConverter::new()), |m, v| {
            m.temperature = v
        })
        .map_property(4, |m: &mut Metar, v: String| m.sky = v)
}

/// Header, comments and `rows` data lines; every seventh row has a bad visibility
fn write_metar_file(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "station,date,visibility,temp,sky").unwrap();
    writeln!(file, "# hourly METAR extract").unwrap();
    for i in 0..rows {
        let visibility = if i % 7 == 6 {
            "unlimited".to_string()
        } else {
            (i % 10).to_string()
        };
        let temperature = if i % 3 == 0 {
            String::new()
        } else {
            format!("{}.25", i % 30)
        };
        writeln!(
            file,
            "K{:04},2015030{},{},{},\"CLR, {}\"",
            i,
            1 + i % 9,
            visibility,
            temperature,
            i
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

fn parser(options: CsvParserOptions) -> CsvParser<Metar> {
    CsvParser::new(options, metar_mapping()).unwrap()
}

fn base_options() -> CsvParserOptions {
    CsvParserOptions::with_header(true, "#").with_chunk_size(MIN_CHUNK_SIZE)
}

fn summary(results: &[MappingResult<Metar>]) -> Vec<(usize, Option<Metar>)> {
    results
        .iter()
        .map(|r| (r.line_number, r.record().cloned()))
        .collect()
}

#[test]
fn test_header_row_and_data_row() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "station,date,visibility,temp,sky").unwrap();
    write!(file, "KMDW,20150301,10,...,CLR").unwrap();
    file.flush().unwrap();

    let mapping = CsvMapping::new()
        .map_property(0, |m: &mut Metar, v: String| m.station = v)
        .map_property_with(1, DateConverter::with_format("%Y%m%d"), |m, v| {
            m.date = Some(v)
        })
        .map_property(4, |m: &mut Metar, v: String| m.sky = v);
    let parser = CsvParser::new(CsvParserOptions::with_header(true, "").sequential(), mapping)
        .unwrap();

    let results = parser.parse_file(file.path()).unwrap().collect_results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].line_number, 1);

    let record = results[0].record().unwrap();
    assert_eq!(record.station, "KMDW");
    assert_eq!(record.date, NaiveDate::from_ymd_opt(2015, 3, 1));
    assert_eq!(record.sky, "CLR");
}

#[test]
fn test_quoted_fields_and_failures_from_file() {
    let file = write_metar_file(14);
    let results = parser(base_options().sequential())
        .parse_file(file.path())
        .unwrap()
        .collect_results()
        .unwrap();

    assert_eq!(results.len(), 14);
    assert_eq!(results[0].line_number, 2);

    let first = results[1].record().unwrap();
    assert_eq!(first.sky, "CLR, 1");
    assert_eq!(first.temperature, Some(1.25));
    assert_eq!(results[0].record().unwrap().temperature, None);

    let failed: Vec<_> = results.iter().filter(|r| !r.is_valid()).collect();
    assert_eq!(failed.len(), 2);
    let error = failed[0].error().unwrap();
    assert_eq!(error.line_number, 8);
    assert_eq!(error.field_errors.len(), 1);
    assert_eq!(error.field_errors[0].index, 2);
    assert_eq!(error.field_errors[0].kind, FieldErrorKind::InvalidValue);
    assert_eq!(error.field_errors[0].raw_value.as_deref(), Some("unlimited"));
}

#[tokio::test]
async fn test_all_pipelines_agree() {
    let file = write_metar_file(500);

    let sequential = parser(base_options().sequential())
        .parse_file(file.path())
        .unwrap()
        .collect_results()
        .unwrap();

    let parallel = parser(base_options().with_degree_of_parallelism(4).with_window_per_worker(16))
        .parse_file(file.path())
        .unwrap()
        .collect_results()
        .unwrap();

    let pipelined = parser(base_options().sequential())
        .parse_file_async(file.path(), CancellationToken::new())
        .await
        .unwrap()
        .collect_results()
        .await
        .unwrap();

    assert_eq!(sequential.len(), 500);
    assert_eq!(summary(&sequential), summary(&parallel));
    assert_eq!(summary(&sequential), summary(&pipelined));
}

#[test]
fn test_unordered_parallel_covers_every_line() {
    let file = write_metar_file(300);
    let options = base_options()
        .with_degree_of_parallelism(3)
        .with_keep_order(false)
        .with_window_per_worker(8);

    let mut lines: Vec<usize> = parser(options)
        .parse_file(file.path())
        .unwrap()
        .collect_results()
        .unwrap()
        .iter()
        .map(|r| r.line_number)
        .collect();
    lines.sort_unstable();

    let expected: Vec<usize> = (2..302).collect();
    assert_eq!(lines, expected);
}

#[tokio::test]
async fn test_async_sink_and_stats() {
    let file = write_metar_file(70);
    let source = tokio::fs::File::open(file.path()).await.unwrap();

    let mut valid = 0usize;
    let mut failed = 0usize;
    let stats = parser(base_options())
        .parse_async_into(source, CancellationToken::new(), &mut |result: MappingResult<Metar>| {
            if result.is_valid() {
                valid += 1;
            } else {
                failed += 1;
            }
        })
        .await
        .unwrap();

    assert_eq!(valid, 60);
    assert_eq!(failed, 10);
    assert_eq!(stats.lines_scanned, 72);
    assert_eq!(stats.lines_filtered, 2);
    assert_eq!(stats.records_parsed, 60);
    assert_eq!(stats.lines_failed, 10);
    assert!(!stats.cancelled);
}

#[test]
fn test_cancellation_mid_file() {
    let file = write_metar_file(1_000);
    let cancel = CancellationToken::new();

    let mut records = parser(base_options().sequential())
        .parse_file(file.path())
        .unwrap()
        .with_cancellation(cancel.clone());

    let mut seen = 0;
    for result in records.by_ref() {
        result.unwrap();
        seen += 1;
        if seen == 25 {
            cancel.cancel();
        }
    }

    assert_eq!(seen, 25);
    assert!(records.stats().cancelled);
}

#[tokio::test]
async fn test_valid_records_from_stream() {
    let file = write_metar_file(21);
    let records: Vec<Metar> = parser(base_options())
        .parse_file_async(file.path(), CancellationToken::new())
        .await
        .unwrap()
        .valid()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(records.len(), 18);
    assert!(records.iter().all(|m| m.date.is_some()));
}

#[test]
fn test_tab_delimited_config_file() {
    let mut data = NamedTempFile::new().unwrap();
    writeln!(data, "KMDW\t20150301\t\t-3.5\tOVC").unwrap();
    writeln!(data, "KORD\t20150302\t7\t\tBKN").unwrap();
    data.flush().unwrap();

    let config = ParserConfig::from_toml_str(
        r#"
        parallelism = 1

        [tokenizer]
        kind = "rfc4180"
        delimiter = "\t"
        "#,
    )
    .unwrap();
    let results = parser(config.into_options().unwrap())
        .parse_file(data.path())
        .unwrap()
        .collect_results()
        .unwrap();

    // Empty visibility keeps its column and fails as a non-nullable int
    let error = results[0].error().unwrap();
    assert_eq!(error.field_errors.len(), 1);
    assert_eq!(error.field_errors[0].index, 2);

    let record = results[1].record().unwrap();
    assert_eq!(record.visibility, 7);
    assert_eq!(record.temperature, None);
    assert_eq!(record.sky, "BKN");
}

#[test]
fn test_custom_tokenizer_instance() {
    let options = CsvParserOptions::new()
        .sequential()
        .with_tokenizer(Rfc4180Tokenizer::new('|', '\'').unwrap());
    let results = parser(options)
        .parse_str("'K|MDW'|20150301|3|1.5|'SCT ''low'''")
        .collect_results()
        .unwrap();

    let record = results[0].record().unwrap();
    assert_eq!(record.station, "K|MDW");
    assert_eq!(record.sky, "SCT 'low'");
}
