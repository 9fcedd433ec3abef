//! `fspromise cat` command.

use std::io::Write;
use std::path::Path;

use crate::encoding::Encoding;
use crate::promises::AsyncFs;

/// Execute the `cat` command.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or the output cannot
/// be written.
pub async fn run(
    fs: &AsyncFs,
    path: &Path,
    encoding: Encoding,
    out: &mut dyn Write,
) -> Result<(), String> {
    let text = fs.read_file_text(path, encoding).await.map_err(|e| e.to_string())?;
    out.write_all(text.as_bytes()).map_err(|e| e.to_string())
}
