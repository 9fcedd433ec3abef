//! Option records for `read_file`, `write` and `write_file`.

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::flags::{OpenFlags, DEFAULT_MODE};

/// Options for reading a whole file. Default: no encoding, flag `r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadFileOptions {
    /// Decode the contents with this encoding; raw bytes when `None`.
    pub encoding: Option<Encoding>,
    /// Flag used when the file is named by path.
    #[serde(with = "flag_string")]
    pub flag: OpenFlags,
}

impl ReadFileOptions {
    /// Sets the encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Sets the open flag.
    #[must_use]
    pub fn flag(mut self, flag: OpenFlags) -> Self {
        self.flag = flag;
        self
    }

    /// The encoding to decode with when a shorthand encoding is also given.
    ///
    /// An encoding set on the record wins over the shorthand.
    #[must_use]
    pub fn resolve_encoding(&self, shorthand: Encoding) -> Encoding {
        self.encoding.unwrap_or(shorthand)
    }
}

impl From<Encoding> for ReadFileOptions {
    fn from(encoding: Encoding) -> Self {
        Self::default().encoding(encoding)
    }
}

impl From<OpenFlags> for ReadFileOptions {
    fn from(flag: OpenFlags) -> Self {
        Self::default().flag(flag)
    }
}

/// Options for replacing a file's contents.
///
/// Default: `utf8`, mode `0o666`, flag `w`. The encoding is ignored for
/// byte payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFileOptions {
    /// Encoding for text payloads.
    pub encoding: Encoding,
    /// Permission bits if the file is created.
    pub mode: u32,
    /// Flag used when the file is named by path.
    #[serde(with = "flag_string")]
    pub flag: OpenFlags,
}

impl Default for WriteFileOptions {
    fn default() -> Self {
        Self { encoding: Encoding::Utf8, mode: DEFAULT_MODE, flag: OpenFlags::Write }
    }
}

impl WriteFileOptions {
    /// Sets the encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the creation mode.
    #[must_use]
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the open flag.
    #[must_use]
    pub fn flag(mut self, flag: OpenFlags) -> Self {
        self.flag = flag;
        self
    }
}

impl From<Encoding> for WriteFileOptions {
    fn from(encoding: Encoding) -> Self {
        Self::default().encoding(encoding)
    }
}

impl From<OpenFlags> for WriteFileOptions {
    fn from(flag: OpenFlags) -> Self {
        Self::default().flag(flag)
    }
}

/// Which part of a buffer `write_range` writes, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteRange {
    /// Index of the first buffer byte to write.
    pub offset: usize,
    /// Number of bytes; the rest of the buffer when `None`.
    pub length: Option<usize>,
    /// File position; the current position when `None`.
    pub position: Option<u64>,
}

impl WriteRange {
    /// Writes the whole buffer at `position`.
    #[must_use]
    pub fn at(position: u64) -> Self {
        Self { position: Some(position), ..Self::default() }
    }
}

mod flag_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::flags::OpenFlags;

    pub fn serialize<S: Serializer>(flag: &OpenFlags, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(flag.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OpenFlags, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
