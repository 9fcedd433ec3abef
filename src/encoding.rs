//! Text encodings for reading and writing strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A character encoding used to turn file bytes into text and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8. Invalid sequences decode to U+FFFD.
    #[default]
    Utf8,
    /// Little-endian UTF-16 (also `ucs2`).
    Utf16Le,
    /// ISO-8859-1 (also `binary`): one byte per code point 0-255.
    Latin1,
    /// 7-bit ASCII. Decoding strips the high bit.
    Ascii,
    /// Lowercase hexadecimal, two characters per byte.
    Hex,
}

impl Encoding {
    /// Canonical encoding name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
            Self::Hex => "hex",
        }
    }

    /// Decodes file bytes into text.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => {
                let units: Vec<u16> =
                    bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect();
                String::from_utf16_lossy(&units)
            }
            Self::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Self::Ascii => bytes.iter().map(|&b| char::from(b & 0x7f)).collect(),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Encodes text into the bytes that are written to a file.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            // low byte of each code point
            Self::Latin1 | Self::Ascii => text.chars().map(|c| u32::from(c) as u8).collect(),
            Self::Hex => decode_hex_prefix(text),
        }
    }
}

/// Decodes hex pairs up to the first pair that is not valid hex.
fn decode_hex_prefix(text: &str) -> Vec<u8> {
    text.as_bytes()
        .chunks_exact(2)
        .map_while(|pair| std::str::from_utf8(pair).ok().and_then(|p| u8::from_str_radix(p, 16).ok()))
        .collect()
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An encoding name that is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown encoding '{0}'")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let encoding = match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Self::Utf8,
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Self::Utf16Le,
            "latin1" | "binary" => Self::Latin1,
            "ascii" => Self::Ascii,
            "hex" => Self::Hex,
            _ => return Err(UnknownEncoding(s.to_string())),
        };
        Ok(encoding)
    }
}
