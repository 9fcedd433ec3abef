//! `fspromise write` command.

use std::path::Path;

use crate::encoding::Encoding;
use crate::flags::OpenFlags;
use crate::options::WriteFileOptions;
use crate::promises::AsyncFs;

/// Execute the `write` command.
///
/// # Errors
///
/// Returns an error string if the file cannot be opened or written.
pub async fn run(
    fs: &AsyncFs,
    path: &Path,
    text: &str,
    encoding: Encoding,
    flag: OpenFlags,
    mode: u32,
) -> Result<(), String> {
    let options = WriteFileOptions::default().encoding(encoding).flag(flag).mode(mode);
    fs.write_file_with(path, text, options).await.map_err(|e| e.to_string())
}
