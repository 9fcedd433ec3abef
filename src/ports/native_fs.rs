//! Native filesystem port: callback-style primitives.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::error::IoResult;
use crate::flags::OpenFlags;
use crate::options::{ReadFileOptions, WriteFileOptions};
use crate::stat::FileStat;

/// One-shot completion invoked with the outcome of a primitive.
pub type Completion<T> = Box<dyn FnOnce(IoResult<T>) + Send + 'static>;

/// An open file descriptor.
///
/// Valid between the `open` that returned it and the matching `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fd(i32);

impl Fd {
    /// Wraps a raw descriptor number.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw descriptor number.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A file named by path or by an already-open descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRef {
    /// A path, opened and closed by the primitive itself.
    Path(PathBuf),
    /// An open descriptor, used from its current position and left open.
    Fd(Fd),
}

impl From<Fd> for FileRef {
    fn from(fd: Fd) -> Self {
        Self::Fd(fd)
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&PathBuf> for FileRef {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}

impl From<&str> for FileRef {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for FileRef {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Data handed to `write_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Raw bytes, written as-is.
    Bytes(Vec<u8>),
    /// Text, encoded with the options' encoding.
    Text(String),
}

impl Payload {
    /// The bytes that end up in the file.
    #[must_use]
    pub fn into_bytes(self, encoding: Encoding) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => encoding.encode(&text),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Contents returned by `read_file`: bytes when no encoding was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileContents {
    /// Raw file bytes.
    Bytes(Vec<u8>),
    /// File bytes decoded with the requested encoding.
    Text(String),
}

impl FileContents {
    /// Decodes `bytes` when `encoding` is given, otherwise keeps them raw.
    #[must_use]
    pub fn decode(bytes: Vec<u8>, encoding: Option<Encoding>) -> Self {
        match encoding {
            Some(encoding) => Self::Text(encoding.decode(&bytes)),
            None => Self::Bytes(bytes),
        }
    }

    /// The contents as bytes; text is re-encoded as UTF-8.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            Self::Text(text) => text.into_bytes(),
        }
    }

    /// The contents as text; bytes are decoded with `encoding`.
    #[must_use]
    pub fn into_text(self, encoding: Encoding) -> String {
        match self {
            Self::Bytes(bytes) => encoding.decode(&bytes),
            Self::Text(text) => text,
        }
    }
}

/// The two call shapes of `write`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteRequest {
    /// Write `length` bytes of `data` starting at `offset`.
    Bytes {
        /// Source buffer.
        data: Vec<u8>,
        /// Index into `data` of the first byte to write.
        offset: usize,
        /// Number of bytes to write; the rest of the buffer when `None`.
        length: Option<usize>,
        /// File position; the current position when `None`.
        position: Option<u64>,
    },
    /// Write `text` encoded with `encoding`.
    Text {
        /// Source text.
        text: String,
        /// File position; the current position when `None`.
        position: Option<u64>,
        /// Encoding applied to `text`.
        encoding: Encoding,
    },
}

impl WriteRequest {
    /// Target file position, if any.
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        match self {
            Self::Bytes { position, .. } | Self::Text { position, .. } => *position,
        }
    }
}

/// The host's filesystem primitives, each reporting through a completion.
///
/// Implementations must invoke every completion exactly once, possibly from
/// another thread. They must not invoke it synchronously while holding locks
/// the caller might need.
pub trait NativeFs: Send + Sync {
    /// Closes `fd`.
    fn close(&self, fd: Fd, done: Completion<()>);

    /// Opens `path` with `flags`; `mode` applies only if the file is created.
    fn open(&self, path: &Path, flags: OpenFlags, mode: u32, done: Completion<Fd>);

    /// Reads the entire contents of `file`.
    fn read_file(&self, file: &FileRef, options: &ReadFileOptions, done: Completion<FileContents>);

    /// Renames `from` to `to`.
    fn rename(&self, from: &Path, to: &Path, done: Completion<()>);

    /// Reports the status of `path`, following symlinks.
    fn stat(&self, path: &Path, done: Completion<FileStat>);

    /// Writes to `fd`, reporting how many bytes were written.
    fn write(&self, fd: Fd, request: WriteRequest, done: Completion<usize>);

    /// Replaces the contents of `file` with `data`.
    fn write_file(
        &self,
        file: &FileRef,
        data: Payload,
        options: &WriteFileOptions,
        done: Completion<()>,
    );
}
