//! Name encoding
//!
//! Converts catalog names between their on-disk byte form and Unicode. HFS stores names in
//! an 8-bit script encoding chosen when the volume was written; HFS+ stores UTF-16BE.
//! Decoding never fails: bytes that cannot be mapped become U+FFFD so that one bad name
//! never blocks rehydration of the rest of a volume.

mod mac_roman;

use crate::error::EncodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text Encoding Converter code for Mac OS Roman.
pub const MAC_CODE_ROMAN: u32 = 0;

/// Text Encoding Converter code for the default Unicode encoding.
pub const MAC_CODE_UNICODE: u32 = 0x100;

/// Encoding of catalog name bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    MacRoman,
    #[serde(rename = "utf16_be")]
    Utf16BigEndian,
    /// A legacy encoding with no table here. ASCII still decodes.
    Unsupported(u32),
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::MacRoman
    }
}

impl TextEncoding {
    /// Map a Text Encoding Converter code (as stored in HFS+ `textEncoding` fields).
    pub fn from_mac_code(code: u32) -> Self {
        match code {
            MAC_CODE_ROMAN => TextEncoding::MacRoman,
            MAC_CODE_UNICODE => TextEncoding::Utf16BigEndian,
            other => TextEncoding::Unsupported(other),
        }
    }

    pub fn mac_code(self) -> u32 {
        match self {
            TextEncoding::MacRoman => MAC_CODE_ROMAN,
            TextEncoding::Utf16BigEndian => MAC_CODE_UNICODE,
            TextEncoding::Unsupported(code) => code,
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::MacRoman => f.write_str("MacRoman"),
            TextEncoding::Utf16BigEndian => f.write_str("UTF-16BE"),
            TextEncoding::Unsupported(code) => write!(f, "text encoding {:#x}", code),
        }
    }
}

/// Stateless converter between name bytes and Unicode strings.
pub struct NameCodec;

impl NameCodec {
    /// Decode name bytes (without any length prefix) into a Unicode string.
    pub fn decode(bytes: &[u8], encoding: TextEncoding) -> String {
        match encoding {
            TextEncoding::MacRoman => bytes.iter().map(|&b| mac_roman::decode_byte(b)).collect(),
            TextEncoding::Utf16BigEndian => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                let mut name = String::from_utf16_lossy(&units);
                if bytes.len() % 2 != 0 {
                    name.push(char::REPLACEMENT_CHARACTER);
                }
                name
            }
            TextEncoding::Unsupported(_) => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        b as char
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                })
                .collect(),
        }
    }

    /// Decode a Pascal string (length byte followed by that many bytes). A length byte that
    /// overruns the buffer is clamped to what is actually present.
    pub fn decode_pascal(pascal: &[u8], encoding: TextEncoding) -> String {
        match pascal.split_first() {
            Some((&len, rest)) => {
                let len = (len as usize).min(rest.len());
                Self::decode(&rest[..len], encoding)
            }
            None => String::new(),
        }
    }

    /// Encode a Unicode name for writing into a catalog of the given encoding.
    pub fn encode(name: &str, encoding: TextEncoding) -> Result<Vec<u8>, EncodeError> {
        match encoding {
            TextEncoding::Utf16BigEndian => Ok(name
                .encode_utf16()
                .flat_map(|unit| unit.to_be_bytes())
                .collect()),
            TextEncoding::MacRoman => {
                Self::encode_with(name, encoding, mac_roman::encode_char)
            }
            TextEncoding::Unsupported(_) => Self::encode_with(name, encoding, |c| {
                if c.is_ascii() {
                    Some(c as u8)
                } else {
                    None
                }
            }),
        }
    }

    /// Encode and prepend a length byte, as stored in HFS catalog keys.
    pub fn encode_pascal(name: &str, encoding: TextEncoding) -> Result<Vec<u8>, EncodeError> {
        let bytes = Self::encode(name, encoding)?;
        let len = u8::try_from(bytes.len()).map_err(|_| EncodeError::TooLong {
            length: bytes.len(),
            max: u8::MAX as usize,
        })?;
        let mut pascal = Vec::with_capacity(bytes.len() + 1);
        pascal.push(len);
        pascal.extend_from_slice(&bytes);
        Ok(pascal)
    }

    fn encode_with(
        name: &str,
        encoding: TextEncoding,
        map: impl Fn(char) -> Option<u8>,
    ) -> Result<Vec<u8>, EncodeError> {
        name.chars()
            .enumerate()
            .map(|(index, character)| {
                map(character).ok_or_else(|| EncodeError::Unrepresentable {
                    character,
                    index,
                    encoding: encoding.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_mac_roman() {
        assert_eq!(NameCodec::decode(b"Read Me", TextEncoding::MacRoman), "Read Me");
        assert_eq!(
            NameCodec::decode(&[0x43, 0x61, 0x66, 0x8E], TextEncoding::MacRoman),
            "Café"
        );
    }

    #[test]
    fn test_decode_utf16_lossy() {
        let bytes = [0x00, 0x41, 0xD8, 0x00, 0x00, 0x42];
        assert_eq!(
            NameCodec::decode(&bytes, TextEncoding::Utf16BigEndian),
            "A\u{FFFD}B"
        );
        assert_eq!(
            NameCodec::decode(&[0x00, 0x41, 0x00], TextEncoding::Utf16BigEndian),
            "A\u{FFFD}"
        );
    }

    #[test]
    fn test_unsupported_encoding_is_best_effort() {
        let decoded = NameCodec::decode(&[b'O', b'K', 0x93], TextEncoding::Unsupported(1));
        assert_eq!(decoded, "OK\u{FFFD}");
        assert!(NameCodec::encode(&decoded, TextEncoding::Unsupported(1)).is_err());
    }

    #[test]
    fn test_decode_pascal_clamps_length() {
        assert_eq!(NameCodec::decode_pascal(&[9, b'a', b'b'], TextEncoding::MacRoman), "ab");
        assert_eq!(NameCodec::decode_pascal(&[], TextEncoding::MacRoman), "");
    }

    #[test]
    fn test_encode_rejects_unrepresentable() {
        let err = NameCodec::encode("a→b", TextEncoding::MacRoman).unwrap_err();
        assert!(matches!(err, EncodeError::Unrepresentable { index: 1, .. }));
    }

    #[test]
    fn test_mac_code_mapping() {
        assert_eq!(TextEncoding::from_mac_code(0), TextEncoding::MacRoman);
        assert_eq!(TextEncoding::from_mac_code(0x100), TextEncoding::Utf16BigEndian);
        assert_eq!(TextEncoding::from_mac_code(1), TextEncoding::Unsupported(1));
        assert_eq!(TextEncoding::Unsupported(1).mac_code(), 1);
    }

    proptest! {
        #[test]
        fn prop_mac_roman_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..32)) {
            let name = NameCodec::decode(&bytes, TextEncoding::MacRoman);
            prop_assert_eq!(NameCodec::encode(&name, TextEncoding::MacRoman).unwrap(), bytes);
        }

        #[test]
        fn prop_utf16_round_trips(name in "\\PC{0,40}") {
            let bytes = NameCodec::encode(&name, TextEncoding::Utf16BigEndian).unwrap();
            prop_assert_eq!(NameCodec::decode(&bytes, TextEncoding::Utf16BigEndian), name);
        }

        #[test]
        fn prop_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64), code in any::<u32>()) {
            let _ = NameCodec::decode(&bytes, TextEncoding::from_mac_code(code));
        }
    }
}
