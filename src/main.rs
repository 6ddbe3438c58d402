use clap::{CommandFactory, Parser};
use csvmap::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

/// Exit code when at least one line failed to map
const EXIT_LINE_FAILURES: i32 = 2;

/// Exit code after CTRL+C, following the shell convention for SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help
    if args.command.is_none() {
        let _ = Args::command().print_help();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // CTRL+C stops reading; the command still reports what it parsed
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, stopping after the current line...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(stats) if stats.cancelled => process::exit(EXIT_INTERRUPTED),
        Ok(stats) if stats.lines_failed > 0 => process::exit(EXIT_LINE_FAILURES),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
