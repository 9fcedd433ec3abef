//! Command dispatch and handlers.

pub mod cat;
pub mod rename;
pub mod stat;
pub mod write;

use std::io::{self, Write};

use crate::cli::Command;
use crate::config::Config;
use crate::context::FsContext;
use crate::promises::AsyncFs;

/// Dispatch a parsed command to its handler.
///
/// When `FSPROMISE_RECORD` is set, every native call is recorded to that
/// cassette; when `FSPROMISE_REPLAY` is set, calls are served from it.
///
/// # Errors
///
/// Returns an error string if the context cannot be built or the selected
/// command fails.
pub fn dispatch(command: &Command, config: &Config) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;

    let ctx = FsContext::from_config(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = runtime.block_on(dispatch_with_fs(command, ctx.fs(), &mut out));
    out.flush().map_err(|e| e.to_string())?;

    // Write the cassette after the command completes (even on error)
    if let Some(path) = ctx.finish()? {
        eprintln!("Recording saved to: {}", path.display());
    }

    result
}

/// Dispatch a command against the given filesystem.
async fn dispatch_with_fs(
    command: &Command,
    fs: &AsyncFs,
    out: &mut dyn Write,
) -> Result<(), String> {
    match command {
        Command::Cat { path, encoding } => cat::run(fs, path, *encoding, out).await,
        Command::Write { path, text, encoding, flag, mode } => {
            write::run(fs, path, text, *encoding, *flag, *mode).await
        }
        Command::Stat { path } => stat::run(fs, path, out).await,
        Command::Mv { from, to } => rename::run(fs, from, to).await,
    }
}
