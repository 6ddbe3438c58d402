//! Byte encodings for streamed input
//!
//! All supported encodings are ASCII-compatible, so a `\n` byte always marks
//! a line end and lines can be split before decoding.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding of a byte source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Encoding {
    /// UTF-8; invalid sequences become U+FFFD
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to the code point of the same value
    Latin1,
    /// 7-bit ASCII; other bytes become U+FFFD
    Ascii,
}

impl Encoding {
    /// Upper bound of the decoded UTF-8 length of `byte_len` input bytes
    pub fn max_decoded_len(&self, byte_len: usize) -> usize {
        match self {
            // Each invalid byte can turn into a three-byte replacement character
            Self::Utf8 | Self::Ascii => byte_len.saturating_mul(3),
            Self::Latin1 => byte_len.saturating_mul(2),
        }
    }

    /// Decode `bytes`, borrowing when they are already valid text
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes),
            Self::Latin1 | Self::Ascii => match std::str::from_utf8(bytes) {
                Ok(text) if text.is_ascii() => Cow::Borrowed(text),
                _ => {
                    let mut out = String::with_capacity(self.max_decoded_len(bytes.len()));
                    self.decode_into(bytes, &mut out);
                    Cow::Owned(out)
                }
            },
        }
    }

    /// Append the decoded form of `bytes` to `out`
    pub fn decode_into(&self, bytes: &[u8], out: &mut String) {
        match self {
            Self::Utf8 => out.push_str(&String::from_utf8_lossy(bytes)),
            Self::Latin1 => out.extend(bytes.iter().map(|&b| char::from(b))),
            Self::Ascii => out.extend(bytes.iter().map(|&b| {
                if b.is_ascii() {
                    char::from(b)
                } else {
                    char::REPLACEMENT_CHARACTER
                }
            })),
        }
    }

    /// Strip a byte order mark from the first line of a source
    pub fn strip_bom<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        match self {
            Self::Utf8 => bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes),
            Self::Latin1 | Self::Ascii => bytes,
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            other => Err(Error::configuration(format!(
                "Unsupported encoding '{}' (expected utf-8, latin1 or ascii)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Encoding {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Encoding> for String {
    fn from(encoding: Encoding) -> Self {
        encoding.to_string()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf-8"),
            Self::Latin1 => write!(f, "latin1"),
            Self::Ascii => write!(f, "ascii"),
        }
    }
}
