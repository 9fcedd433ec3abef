//! Binary entrypoint for the `fspromise` CLI.

use std::process::ExitCode;

use fspromise::config::{Config, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_logging(DEFAULT_LOG_FILTER);
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.log_filter);

    // Recording and replay are selected in commands::dispatch from the config.
    match fspromise::run_with_config(std::env::args_os(), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(directives: &str) {
    let filter =
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
