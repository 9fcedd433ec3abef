//! The single error type surfaced by every filesystem operation.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::Fd;

/// Result type for filesystem operations.
pub type IoResult<T> = Result<T, IoError>;

/// The primitive an error (or a recorded interaction) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `close(fd)`.
    Close,
    /// `open(path, flags, mode)`.
    Open,
    /// `read_file(file, options)`.
    ReadFile,
    /// `rename(old, new)`.
    Rename,
    /// `stat(path)`.
    Stat,
    /// `write(fd, data, ...)`.
    Write,
    /// `write_file(file, data, options)`.
    WriteFile,
}

impl Operation {
    /// Name used in error messages and cassette method keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::Open => "open",
            Self::ReadFile => "read_file",
            Self::Rename => "rename",
            Self::Stat => "stat",
            Self::Write => "write",
            Self::WriteFile => "write_file",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a failed operation was acting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A filesystem path.
    Path(PathBuf),
    /// An open descriptor.
    Fd(Fd),
    /// Source and destination of a rename.
    Rename {
        /// Original path.
        from: PathBuf,
        /// New path.
        to: PathBuf,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "'{}'", path.display()),
            Self::Fd(fd) => write!(f, "fd {fd}"),
            Self::Rename { from, to } => write!(f, "'{}' -> '{}'", from.display(), to.display()),
        }
    }
}

/// A failed filesystem operation.
///
/// Carries the operation, the path or descriptor it was applied to, and the
/// operating-system error unchanged.
#[derive(Debug, Error)]
#[error("{operation} {target}: {source}")]
pub struct IoError {
    operation: Operation,
    target: Target,
    #[source]
    source: io::Error,
}

impl IoError {
    /// Wraps an OS error for `operation` on `target`.
    pub fn new(operation: Operation, target: Target, source: io::Error) -> Self {
        Self { operation, target, source }
    }

    /// Error for a path-based operation.
    pub fn at_path(operation: Operation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::new(operation, Target::Path(path.into()), source)
    }

    /// Error for a descriptor-based operation.
    #[must_use]
    pub fn at_fd(operation: Operation, fd: Fd, source: io::Error) -> Self {
        Self::new(operation, Target::Fd(fd), source)
    }

    /// The descriptor is not open in the table it was looked up in.
    #[must_use]
    pub fn bad_descriptor(operation: Operation, fd: Fd) -> Self {
        Self::at_fd(operation, fd, bad_descriptor_error())
    }

    /// The native primitive dropped its completion without invoking it.
    #[must_use]
    pub fn abandoned(operation: Operation, target: Target) -> Self {
        Self::new(
            operation,
            target,
            io::Error::other("completion dropped before the operation finished"),
        )
    }

    /// The operation that failed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// What the operation was acting on.
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The offending path, if the operation was path-based.
    ///
    /// For a rename this is the source path.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::Path(path) | Target::Rename { from: path, .. } => Some(path),
            Target::Fd(_) => None,
        }
    }

    /// The offending descriptor, if the operation was descriptor-based.
    #[must_use]
    pub fn fd(&self) -> Option<Fd> {
        match self.target {
            Target::Fd(fd) => Some(fd),
            _ => None,
        }
    }

    /// The error category reported by the OS.
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }

    /// The raw OS error number, when the failure came from a system call.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.raw_os_error()
    }

    /// Symbolic error code such as `ENOENT` or `EEXIST`.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        self.raw_os_error().and_then(errno_name).or_else(|| kind_name(self.kind()))
    }

    /// The underlying OS error.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    /// Returns true if the path did not resolve.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == io::ErrorKind::NotFound
    }

    /// Returns true if an exclusive create hit an existing file.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        self.kind() == io::ErrorKind::AlreadyExists
    }
}

impl From<IoError> for io::Error {
    fn from(err: IoError) -> Self {
        let message = err.to_string();
        match err.source.raw_os_error() {
            Some(_) => err.source,
            None => io::Error::new(err.source.kind(), message),
        }
    }
}

/// The error a closed or never-opened descriptor produces.
pub(crate) fn bad_descriptor_error() -> io::Error {
    #[cfg(unix)]
    {
        io::Error::from_raw_os_error(libc::EBADF)
    }
    #[cfg(not(unix))]
    {
        io::Error::new(io::ErrorKind::InvalidInput, "bad file descriptor")
    }
}

#[cfg(unix)]
fn errno_name(errno: i32) -> Option<&'static str> {
    let name = match errno {
        libc::ENOENT => "ENOENT",
        libc::EEXIST => "EEXIST",
        libc::EACCES => "EACCES",
        libc::EPERM => "EPERM",
        libc::EBADF => "EBADF",
        libc::EISDIR => "EISDIR",
        libc::ENOTDIR => "ENOTDIR",
        libc::ENOTEMPTY => "ENOTEMPTY",
        libc::EINVAL => "EINVAL",
        libc::ENOSPC => "ENOSPC",
        libc::EXDEV => "EXDEV",
        libc::EMFILE => "EMFILE",
        libc::EROFS => "EROFS",
        libc::ELOOP => "ELOOP",
        libc::ENAMETOOLONG => "ENAMETOOLONG",
        libc::EBUSY => "EBUSY",
        libc::EIO => "EIO",
        _ => return None,
    };
    Some(name)
}

#[cfg(not(unix))]
fn errno_name(_errno: i32) -> Option<&'static str> {
    None
}

fn kind_name(kind: io::ErrorKind) -> Option<&'static str> {
    let name = match kind {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::AlreadyExists => "EEXIST",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::InvalidInput => "EINVAL",
        io::ErrorKind::Interrupted => "EINTR",
        io::ErrorKind::WouldBlock => "EAGAIN",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_operation_and_target() {
        let err = IoError::at_path(
            Operation::Open,
            "/tmp/missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let text = err.to_string();
        assert!(text.starts_with("open '/tmp/missing.txt'"));
        assert!(text.contains("no such file"));
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some("ENOENT"));
        assert_eq!(err.path(), Some(Path::new("/tmp/missing.txt")));
        assert_eq!(err.fd(), None);
    }

    #[test]
    fn bad_descriptor_reports_fd() {
        let err = IoError::bad_descriptor(Operation::Close, Fd::from_raw(7));
        assert_eq!(err.fd(), Some(Fd::from_raw(7)));
        assert_eq!(err.operation(), Operation::Close);
        assert_eq!(err.to_string().split(':').next(), Some("close fd 7"));
        #[cfg(unix)]
        assert_eq!(err.code(), Some("EBADF"));
    }

    #[test]
    fn rename_target_exposes_source_path() {
        let err = IoError::new(
            Operation::Rename,
            Target::Rename { from: "a".into(), to: "b".into() },
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.path(), Some(Path::new("a")));
        assert!(err.to_string().contains("'a' -> 'b'"));
    }

    #[test]
    fn converts_back_into_io_error_keeping_kind() {
        let err = IoError::abandoned(Operation::Stat, Target::Path("x".into()));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
        assert!(io_err.to_string().contains("completion dropped"));
    }
}
