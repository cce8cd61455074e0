//! Output text encodings.
//!
//! The export is written either as UTF-8 or transcoded to Shift_JIS for
//! downstream tools that only read the legacy Japanese encoding. Encoding is
//! strict: a character without a Shift_JIS mapping is an error, never
//! replaced.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{EncoderResult, SHIFT_JIS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while transcoding text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The character has no representation in the target encoding.
    #[error("character {character:?} cannot be encoded as {encoding}")]
    Unmappable {
        character: char,
        encoding: TextEncoding,
    },

    /// The encoder stopped before consuming its input.
    #[error("{encoding} encoder did not consume the whole input")]
    Incomplete { encoding: TextEncoding },
}

/// Target encoding of the exported file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    /// Shift_JIS, as expected by the time-tracking tools consuming the file.
    #[default]
    ShiftJis,
    /// Plain UTF-8.
    Utf8,
}

impl TextEncoding {
    /// Returns the canonical configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftJis => "sjis",
            Self::Utf8 => "utf8",
        }
    }

    /// Encodes `text` into bytes of this encoding.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::ShiftJis => encode_strict(*self, text),
        }
    }

    /// Decodes bytes of this encoding back to a string.
    ///
    /// Returns `None` when the bytes are malformed.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            Self::ShiftJis => SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned()),
        }
    }
}

fn encode_strict(encoding: TextEncoding, text: &str) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = SHIFT_JIS.new_encoder();
    let capacity = encoder
        .max_buffer_length_from_utf8_without_replacement(text.len())
        .ok_or(EncodeError::Incomplete { encoding })?;
    let mut out = Vec::with_capacity(capacity);

    let (result, _read) = encoder.encode_from_utf8_to_vec_without_replacement(text, &mut out, true);
    match result {
        EncoderResult::InputEmpty => Ok(out),
        EncoderResult::Unmappable(character) => Err(EncodeError::Unmappable {
            character,
            encoding,
        }),
        EncoderResult::OutputFull => Err(EncodeError::Incomplete { encoding }),
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShiftJis => write!(f, "Shift_JIS"),
            Self::Utf8 => write!(f, "UTF-8"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "sjis" | "shiftjis" | "cp932" => Ok(Self::ShiftJis),
            "utf8" => Ok(Self::Utf8),
            other => Err(format!("unknown encoding '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_passthrough() {
        let bytes = TextEncoding::Utf8.encode("作業時間").unwrap();
        assert_eq!(bytes, "作業時間".as_bytes());
    }

    #[test]
    fn shift_jis_encodes_header_text() {
        let bytes = TextEncoding::ShiftJis.encode("開始").unwrap();
        assert_eq!(bytes, vec![0x8A, 0x4A, 0x8E, 0x6E]);
    }

    #[test]
    fn shift_jis_keeps_ascii() {
        let bytes = TextEncoding::ShiftJis.encode("Design review\t8.50\r\n").unwrap();
        assert_eq!(bytes, b"Design review\t8.50\r\n");
    }

    #[test]
    fn shift_jis_rejects_unmappable() {
        let err = TextEncoding::ShiftJis.encode("ok 😀").unwrap_err();
        assert_eq!(
            err,
            EncodeError::Unmappable {
                character: '😀',
                encoding: TextEncoding::ShiftJis,
            }
        );
        assert!(err.to_string().contains("Shift_JIS"));
    }

    #[test]
    fn shift_jis_decode_roundtrip() {
        let bytes = TextEncoding::ShiftJis.encode("作業概要").unwrap();
        assert_eq!(
            TextEncoding::ShiftJis.decode(&bytes).as_deref(),
            Some("作業概要")
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!("sjis".parse::<TextEncoding>().unwrap(), TextEncoding::ShiftJis);
        assert_eq!("Shift_JIS".parse::<TextEncoding>().unwrap(), TextEncoding::ShiftJis);
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert!("latin1".parse::<TextEncoding>().is_err());
    }
}
