//! `fspromise mv` command.

use std::path::Path;

use crate::promises::AsyncFs;

/// Execute the `mv` command.
///
/// # Errors
///
/// Returns an error string if the rename fails.
pub async fn run(fs: &AsyncFs, from: &Path, to: &Path) -> Result<(), String> {
    fs.rename(from, to).await.map_err(|e| e.to_string())
}
