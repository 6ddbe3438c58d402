//! Command implementations for the csvmap CLI
//!
//! This module contains the validate command: it resolves parser settings,
//! runs the requested pipeline over a file, reports failing lines and prints
//! a summary.

use crate::cli::args::{Args, Commands, OutputFormat, ValidateArgs};
use crate::cli::schema::{self, Row};
use crate::config::ParserConfig;
use crate::constants::PROGRESS_UPDATE_INTERVAL;
use crate::mapping::{LineError, MappingResult};
use crate::parser::{CsvParser, ParseStats};
use anyhow::{Context, bail};
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Main command runner for csvmap
pub async fn run(args: Args, cancel: CancellationToken) -> anyhow::Result<ParseStats> {
    match args.command {
        Some(Commands::Validate(validate_args)) => run_validate(validate_args, cancel).await,
        None => bail!("No command given; run `csvmap --help` for usage"),
    }
}

/// Validate command runner
///
/// Parses the whole file with the declared columns and returns the run's
/// counters. Failing lines are reported, not returned as errors.
pub async fn run_validate(
    args: ValidateArgs,
    cancel: CancellationToken,
) -> anyhow::Result<ParseStats> {
    let start_time = Instant::now();

    setup_logging(&args);
    debug!("Validate arguments: {:?}", args);

    args.validate()?;

    let parser = build_parser(&args)?;
    info!("Validating {} ({})", args.file.display(), parser.options());

    let progress = args.show_progress().then(|| progress_spinner(&args));
    let report = FailureReport::new(args.max_errors, progress);

    let (report, stats) = if args.use_async {
        validate_async(&args, parser, report, cancel).await?
    } else {
        validate_blocking(&args, parser, report, cancel).await?
    };

    if let Some(pb) = &report.progress {
        pb.finish_and_clear();
    }

    match args.output_format {
        OutputFormat::Human => print_human_report(&args, &report, &stats, start_time.elapsed()),
        OutputFormat::Toml => print_toml_report(&stats)?,
    }

    info!(
        "Validation finished in {:.2}s: {}",
        start_time.elapsed().as_secs_f64(),
        stats
    );
    Ok(stats)
}

/// Config file first, then flags on top
fn build_parser(args: &ValidateArgs) -> anyhow::Result<CsvParser<Row>> {
    let base = match &args.config_file {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ParserConfig::default(),
    };
    let options = base
        .merge(args.config_overrides())
        .into_options()
        .context("Invalid parser settings")?;

    let mapping = schema::build_mapping(&args.columns).context("Invalid column declarations")?;
    Ok(CsvParser::new(options, mapping)?)
}

async fn validate_blocking(
    args: &ValidateArgs,
    parser: CsvParser<Row>,
    mut report: FailureReport,
    cancel: CancellationToken,
) -> anyhow::Result<(FailureReport, ParseStats)> {
    let path = args.file.clone();

    // The iterator blocks on file reads and on the worker pool
    let task = tokio::task::spawn_blocking(move || -> crate::Result<(FailureReport, ParseStats)> {
        let mut records = parser.parse_file(&path)?.with_cancellation(cancel);
        for result in records.by_ref() {
            report.record(result?);
        }
        Ok((report, records.stats()))
    });

    let outcome = task.await.context("Parse task failed")??;
    Ok(outcome)
}

async fn validate_async(
    args: &ValidateArgs,
    parser: CsvParser<Row>,
    mut report: FailureReport,
    cancel: CancellationToken,
) -> anyhow::Result<(FailureReport, ParseStats)> {
    let file = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let stats = parser
        .pipeline(file, cancel)
        .drive(&mut |result: MappingResult<Row>| report.record(result))
        .await?;
    Ok((report, stats))
}

/// Keeps the first failing lines and ticks the spinner
struct FailureReport {
    max_errors: usize,
    failures: Vec<LineError>,
    seen: usize,
    progress: Option<ProgressBar>,
}

impl FailureReport {
    fn new(max_errors: usize, progress: Option<ProgressBar>) -> Self {
        Self {
            max_errors,
            failures: Vec::new(),
            seen: 0,
            progress,
        }
    }

    fn record(&mut self, result: MappingResult<Row>) {
        self.seen += 1;
        if self.seen % PROGRESS_UPDATE_INTERVAL == 0 {
            if let Some(pb) = &self.progress {
                pb.set_message(format!("{} lines mapped", self.seen));
            }
        }

        if let Err(error) = result.result {
            if self.failures.len() < self.max_errors {
                self.failures.push(error);
            }
        }
    }
}

fn progress_spinner(args: &ValidateArgs) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Parsing {}...", args.file.display()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_human_report(
    args: &ValidateArgs,
    report: &FailureReport,
    stats: &ParseStats,
    elapsed: Duration,
) {
    if !report.failures.is_empty() {
        println!("{}", "Failing lines:".bold());
        for error in &report.failures {
            println!(
                "  {} {} field error(s)",
                format!("line {}:", error.line_number).yellow(),
                error.field_errors.len()
            );
            for field in &error.field_errors {
                println!("    - {}", field);
            }
        }
        if stats.lines_failed > report.failures.len() {
            println!(
                "  ... and {} more failing lines",
                stats.lines_failed - report.failures.len()
            );
        }
        println!();
    }

    let status = if stats.cancelled {
        "INTERRUPTED".yellow().bold()
    } else if stats.is_clean() {
        "PASS".green().bold()
    } else {
        "FAIL".red().bold()
    };

    println!("{} {}", "Validation:".bold(), status);
    println!("  File:            {}", args.file.display());
    println!("  Lines scanned:   {}", stats.lines_scanned);
    println!("  Lines filtered:  {}", stats.lines_filtered);
    println!("  Records parsed:  {}", stats.records_parsed.to_string().green());
    let failed = stats.lines_failed.to_string();
    if stats.lines_failed > 0 {
        println!("  Lines failed:    {}", failed.red());
    } else {
        println!("  Lines failed:    {}", failed);
    }
    println!("  Success rate:    {:.1}%", stats.success_rate());
    println!("  Elapsed:         {}", HumanDuration(elapsed));
}

fn print_toml_report(stats: &ParseStats) -> anyhow::Result<()> {
    let document = toml::to_string(stats).context("Failed to serialize summary")?;
    print!("{}", document);
    Ok(())
}

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence over the verbosity flags. A second call keeps
/// the subscriber installed first.
pub fn setup_logging(args: &ValidateArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("csvmap={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::schema::ColumnSpec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn validate_args(file: &NamedTempFile, columns: &[&str]) -> ValidateArgs {
        ValidateArgs {
            file: file.path().to_path_buf(),
            columns: columns.iter().map(|c| c.parse::<ColumnSpec>().unwrap()).collect(),
            config_file: None,
            skip_header: true,
            comment_prefix: Some("#".to_string()),
            delimiter: None,
            quote: None,
            parallelism: Some(1),
            unordered: false,
            encoding: None,
            use_async: false,
            max_errors: 1,
            verbose: 0,
            quiet: true,
            output_format: OutputFormat::Toml,
        }
    }

    const WEATHER: &str = "station,date,temp\n\
                           # comment\n\
                           KMDW,20150301,-1.5\n\
                           KORD,20150302,warm\n\
                           KMDW,bad,oops\n";

    #[tokio::test]
    async fn test_validate_blocking_counts_failures() {
        let file = write_csv(WEATHER);
        let args = validate_args(&file, &["0:string", "1:date:%Y%m%d", "2:float"]);

        let stats = run_validate(args, CancellationToken::new()).await.unwrap();
        assert_eq!(stats.lines_scanned, 5);
        assert_eq!(stats.lines_filtered, 2);
        assert_eq!(stats.records_parsed, 1);
        assert_eq!(stats.lines_failed, 2);
    }

    #[tokio::test]
    async fn test_validate_async_matches_blocking() {
        let file = write_csv(WEATHER);
        let mut args = validate_args(&file, &["0:string", "1:date:%Y%m%d", "2:float"]);
        let blocking = run_validate(args.clone(), CancellationToken::new()).await.unwrap();

        args.use_async = true;
        let pipelined = run_validate(args, CancellationToken::new()).await.unwrap();
        assert_eq!(blocking, pipelined);
    }

    #[tokio::test]
    async fn test_validate_parallel_run() {
        let file = write_csv(WEATHER);
        let mut args = validate_args(&file, &["0:string", "1:date:%Y%m%d", "2:float?"]);
        args.parallelism = Some(2);

        let stats = run_validate(args, CancellationToken::new()).await.unwrap();
        assert_eq!(stats.records_parsed, 1);
        assert_eq!(stats.lines_failed, 2);
    }

    #[tokio::test]
    async fn test_validate_cancelled_before_start() {
        let file = write_csv(WEATHER);
        let args = validate_args(&file, &["0:string"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stats = run_validate(args, cancel).await.unwrap();
        assert!(stats.cancelled);
        assert_eq!(stats.lines_mapped(), 0);
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_config() {
        let file = write_csv(WEATHER);
        let config = write_csv("parallelism = \"many\"\n");
        let mut args = validate_args(&file, &["0:string"]);
        args.config_file = Some(config.path().to_path_buf());

        assert!(run_validate(args, CancellationToken::new()).await.is_err());
    }

    #[test]
    fn test_failure_report_keeps_first_errors() {
        let mut report = FailureReport::new(1, None);
        report.record(MappingResult::success(0, Row::default()));
        report.record(MappingResult::failure(1, Vec::new()));
        report.record(MappingResult::failure(2, Vec::new()));

        assert_eq!(report.seen, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].line_number, 1);
    }
}
