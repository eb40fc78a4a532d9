//! Shipmate - decide which monorepo packages need a release

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

/// Crates whose events reach the console by default
const CONSOLE_TARGETS: [&str; 3] = ["shipmate", "shipmate_core", "shipmate_git"];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(console_directives(cli.verbose, cli.quiet));

    cli.execute()
}

/// Console filter for the given verbosity flags. Other crates stay at `warn`.
fn console_directives(verbose: bool, quiet: bool) -> String {
    let level = match (verbose, quiet) {
        (_, true) => "error",
        (true, false) => "debug",
        (false, false) => "warn",
    };
    std::iter::once("warn".to_string())
        .chain(CONSOLE_TARGETS.iter().map(|target| format!("{target}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Set up tracing with two layers:
/// - Console on stderr: `RUST_LOG` if set, else the shipmate crates at the
///   level picked by `-v`/`-q`
/// - File: debug-level JSON for the shipmate crates in ~/.shipmate/logs/
fn init_tracing(directives: String) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let Some(log_dir) = log_directory() else {
        tracing_subscriber::registry().with(console).init();
        return None;
    };

    let file_appender = tracing_appender::rolling::daily(&log_dir, "shipmate.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_filter = EnvFilter::new(console_directives(true, false));

    tracing_subscriber::registry()
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_filter(file_filter),
        )
        .init();

    Some(guard)
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".shipmate").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
