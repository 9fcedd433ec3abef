//! `fspromise stat` command.

use std::io::Write;
use std::path::Path;

use crate::promises::AsyncFs;
use crate::stat::{FileKind, FileStat};

/// Execute the `stat` command.
///
/// Prints one `key: value` line each for size, kind, mode and mtime.
///
/// # Errors
///
/// Returns an error string if the path does not resolve or the output cannot
/// be written.
pub async fn run(fs: &AsyncFs, path: &Path, out: &mut dyn Write) -> Result<(), String> {
    let stat = fs.stat(path).await.map_err(|e| e.to_string())?;
    out.write_all(render(&stat).as_bytes()).map_err(|e| e.to_string())
}

fn render(stat: &FileStat) -> String {
    let kind = match stat.kind {
        FileKind::File => "file",
        FileKind::Directory => "directory",
        FileKind::Symlink => "symlink",
        FileKind::Other => "other",
    };
    format!(
        "size: {}\nkind: {kind}\nmode: {:o}\nmtime: {}\n",
        stat.size,
        stat.mode,
        stat.mtime.to_rfc3339()
    )
}
