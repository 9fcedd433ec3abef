//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::encoding::Encoding;
use crate::flags::{parse_mode, OpenFlags};

/// Top-level CLI parser for `fspromise`.
#[derive(Debug, Parser)]
#[command(name = "fspromise", version, about = "Read, write, stat and rename files")]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a file's contents.
    Cat {
        /// File to read.
        path: PathBuf,
        /// Decode with this encoding.
        #[arg(long, short, default_value = "utf8")]
        encoding: Encoding,
    },
    /// Replace a file's contents with TEXT.
    Write {
        /// File to write.
        path: PathBuf,
        /// Text to write.
        text: String,
        /// Encode with this encoding.
        #[arg(long, short, default_value = "utf8")]
        encoding: Encoding,
        /// Open flag, e.g. `a` to append or `wx` to refuse existing files.
        #[arg(long, short, default_value = "w")]
        flag: OpenFlags,
        /// Permission bits for a newly created file, in octal.
        #[arg(long, short, default_value = "666", value_parser = parse_mode)]
        mode: u32,
    },
    /// Show a file's size, kind, mode and modification time.
    Stat {
        /// File to inspect.
        path: PathBuf,
    },
    /// Rename a file.
    Mv {
        /// Current name.
        from: PathBuf,
        /// New name.
        to: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cat_with_default_encoding() {
        let cli = Cli::parse_from(["fspromise", "cat", "notes.txt"]);
        match cli.command {
            Command::Cat { path, encoding } => {
                assert_eq!(path, PathBuf::from("notes.txt"));
                assert_eq!(encoding, Encoding::Utf8);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_write_options() {
        let cli = Cli::parse_from([
            "fspromise", "write", "out.txt", "hi", "--encoding", "latin1", "--flag", "a", "--mode",
            "0600",
        ]);
        match cli.command {
            Command::Write { path, text, encoding, flag, mode } => {
                assert_eq!(path, PathBuf::from("out.txt"));
                assert_eq!(text, "hi");
                assert_eq!(encoding, Encoding::Latin1);
                assert_eq!(flag, OpenFlags::Append);
                assert_eq!(mode, 0o600);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_flag() {
        let err = Cli::try_parse_from(["fspromise", "write", "a", "b", "--flag", "z"]).unwrap_err();
        assert!(err.to_string().contains("unknown open flag"), "{err}");
    }

    #[test]
    fn parses_mv() {
        let cli = Cli::parse_from(["fspromise", "mv", "a", "b"]);
        assert!(matches!(cli.command, Command::Mv { .. }));
    }
}
