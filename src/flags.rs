//! Open flags and creation modes.

use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// Permission bits applied when `open` or `write_file` creates a file.
pub const DEFAULT_MODE: u32 = 0o666;

/// How a file is opened.
///
/// Each variant corresponds to one of the conventional flag strings
/// (`r`, `r+`, `rs+`, `w`, `wx`, `w+`, `wx+`, `a`, `ax`, `a+`, `ax+`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenFlags {
    /// `r`: read. Fails if the file does not exist.
    #[default]
    Read,
    /// `r+`: read and write. Fails if the file does not exist.
    ReadWrite,
    /// `rs+`: read and write with synchronous writes.
    ReadWriteSync,
    /// `w`: write, creating or truncating.
    Write,
    /// `wx`: like `w` but fails if the path exists.
    WriteExclusive,
    /// `w+`: read and write, creating or truncating.
    WriteRead,
    /// `wx+`: like `w+` but fails if the path exists.
    WriteReadExclusive,
    /// `a`: append, creating if missing.
    Append,
    /// `ax`: like `a` but fails if the path exists.
    AppendExclusive,
    /// `a+`: read and append, creating if missing.
    AppendRead,
    /// `ax+`: like `a+` but fails if the path exists.
    AppendReadExclusive,
}

impl OpenFlags {
    /// Every flag, in the order they are conventionally listed.
    pub const ALL: [Self; 11] = [
        Self::Read,
        Self::ReadWrite,
        Self::ReadWriteSync,
        Self::Write,
        Self::WriteExclusive,
        Self::WriteRead,
        Self::WriteReadExclusive,
        Self::Append,
        Self::AppendExclusive,
        Self::AppendRead,
        Self::AppendReadExclusive,
    ];

    /// The conventional flag string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::ReadWrite => "r+",
            Self::ReadWriteSync => "rs+",
            Self::Write => "w",
            Self::WriteExclusive => "wx",
            Self::WriteRead => "w+",
            Self::WriteReadExclusive => "wx+",
            Self::Append => "a",
            Self::AppendExclusive => "ax",
            Self::AppendRead => "a+",
            Self::AppendReadExclusive => "ax+",
        }
    }

    /// Whether the descriptor can be read from.
    #[must_use]
    pub fn readable(self) -> bool {
        !matches!(self, Self::Write | Self::WriteExclusive | Self::Append | Self::AppendExclusive)
    }

    /// Whether the descriptor can be written to.
    #[must_use]
    pub fn writable(self) -> bool {
        self != Self::Read
    }

    /// Whether opening fails when the path already exists.
    #[must_use]
    pub fn exclusive(self) -> bool {
        matches!(
            self,
            Self::WriteExclusive
                | Self::WriteReadExclusive
                | Self::AppendExclusive
                | Self::AppendReadExclusive
        )
    }

    /// Whether writes always go to the end of the file.
    #[must_use]
    pub fn appends(self) -> bool {
        matches!(
            self,
            Self::Append | Self::AppendExclusive | Self::AppendRead | Self::AppendReadExclusive
        )
    }

    /// Whether an existing file is truncated on open.
    #[must_use]
    pub fn truncates(self) -> bool {
        matches!(
            self,
            Self::Write | Self::WriteExclusive | Self::WriteRead | Self::WriteReadExclusive
        )
    }

    /// Whether a missing file is created.
    #[must_use]
    pub fn creates(self) -> bool {
        !matches!(self, Self::Read | Self::ReadWrite | Self::ReadWriteSync)
    }

    /// Whether writes are synchronous.
    #[must_use]
    pub fn synchronous(self) -> bool {
        self == Self::ReadWriteSync
    }

    /// Builds the host open options for this flag and creation `mode`.
    ///
    /// `mode` is only honoured on unix, and only when the file is created.
    #[must_use]
    pub fn to_open_options(self, mode: u32) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.readable());
        if self.appends() {
            options.append(true);
        } else {
            options.write(self.writable());
        }
        if self.exclusive() {
            options.create_new(true);
        } else {
            options.create(self.creates()).truncate(self.truncates());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
            if self.synchronous() {
                options.custom_flags(libc::O_SYNC);
            }
        }
        #[cfg(not(unix))]
        let _ = mode;

        options
    }
}

impl fmt::Display for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flag string that is not one of the eleven known flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown open flag '{0}' (expected one of r, r+, rs+, w, wx, w+, wx+, a, ax, a+, ax+)")]
pub struct UnknownFlag(pub String);

impl FromStr for OpenFlags {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `xw` / `sr+` orderings are accepted by most hosts as synonyms
        let flags = match s {
            "r" => Self::Read,
            "r+" => Self::ReadWrite,
            "rs+" | "sr+" => Self::ReadWriteSync,
            "w" => Self::Write,
            "wx" | "xw" => Self::WriteExclusive,
            "w+" => Self::WriteRead,
            "wx+" | "xw+" => Self::WriteReadExclusive,
            "a" => Self::Append,
            "ax" | "xa" => Self::AppendExclusive,
            "a+" => Self::AppendRead,
            "ax+" | "xa+" => Self::AppendReadExclusive,
            other => return Err(UnknownFlag(other.to_string())),
        };
        Ok(flags)
    }
}

/// Parses a creation mode given as an octal string (`"644"`, `"0644"`, `"0o644"`).
///
/// # Errors
///
/// Returns an error message if the string is not valid octal or exceeds `0o7777`.
pub fn parse_mode(text: &str) -> Result<u32, String> {
    let digits = text.strip_prefix("0o").unwrap_or(text);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid mode '{text}': {e}"))?;
    if mode > 0o7777 {
        return Err(format!("invalid mode '{text}': exceeds 0o7777"));
    }
    Ok(mode)
}
