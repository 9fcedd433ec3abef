//! Future-returning wrappers over callback-style filesystem primitives.
//!
//! The [`NativeFs`] port describes seven primitives (`close`, `open`,
//! `read_file`, `rename`, `stat`, `write`, `write_file`) that report through
//! a one-shot completion. [`AsyncFs`] exposes each of them as an `async fn`.
//! Adapters provide the primitives against the host filesystem
//! ([`LiveNativeFs`]), or record and replay them through YAML cassettes.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod encoding;
pub mod error;
pub mod flags;
pub mod options;
pub mod ports;
pub mod promises;
pub mod stat;

use clap::error::ErrorKind;
use clap::Parser;

pub use adapters::live::LiveNativeFs;
pub use encoding::Encoding;
pub use error::{IoError, IoResult, Operation};
pub use flags::OpenFlags;
pub use options::{ReadFileOptions, WriteFileOptions, WriteRange};
pub use ports::{Fd, FileContents, FileRef, NativeFs, Payload};
pub use promises::AsyncFs;
pub use stat::{FileKind, FileStat};

/// Run the CLI with the provided arguments, configured from the environment.
///
/// # Errors
///
/// Returns an error string when argument parsing fails, the environment is
/// misconfigured, or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    run_with_config(args, &config::Config::from_env()?)
}

/// Run the CLI with the provided arguments and configuration.
///
/// `--help` and `--version` print to stdout and succeed.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution
/// fails.
pub fn run_with_config<I, T>(args: I, config: &config::Config) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return err.print().map_err(|e| e.to_string());
        }
        Err(err) => return Err(err.to_string()),
    };
    commands::dispatch(&cli.command, config)
}
