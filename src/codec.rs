// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Text codecs for key and signature material.
//!
//! Keys and signatures cross the wire as lowercase hex or standard base64.
//! The strict decoders reject malformed input with [`FormatError`]; the
//! lenient hex decoder reproduces the legacy client behavior for
//! caller-supplied key strings (see [`decode_hex_lenient`]).

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Malformed codec input.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("invalid hex input: {0}")]
    Hex(String),

    #[error("invalid base64 input: {0}")]
    Base64(String),
}

/// Encode bytes as lowercase hex, two characters per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decode a lowercase or uppercase hex string.
///
/// Fails on odd-length input or any non-hex character.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, FormatError> {
    hex::decode(input).map_err(|e| FormatError::Hex(e.to_string()))
}

/// Decode hex by extracting adjacent hex-digit pairs and silently dropping
/// everything else; input with no pairs yields an empty vector.
///
/// This is a compatibility quirk carried over from the first-generation
/// client, kept only on the encoded-private-key import path. Garbage that
/// survives it is still caught downstream because PKCS#8 parsing rejects
/// truncated key material.
pub fn decode_hex_lenient(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (hex_digit(bytes[i]), hex_digit(bytes[i + 1])) {
            (Some(hi), Some(lo)) => {
                out.push(hi << 4 | lo);
                i += 2;
            }
            _ => i += 1,
        }
    }
    out
}

/// Encode bytes as standard (non-URL-safe) base64 with padding.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64 with padding.
///
/// Fails on invalid alphabet or padding.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, FormatError> {
    STANDARD
        .decode(input)
        .map_err(|e| FormatError::Base64(e.to_string()))
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|v| v as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips() {
        for bytes in [
            &[][..],
            &[0x00][..],
            &[0xff][..],
            &[0x00, 0x01, 0xab, 0xcd, 0xef][..],
            &[0xde, 0xad, 0xbe, 0xef][..],
        ] {
            assert_eq!(decode_hex(&encode_hex(bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn base64_round_trips() {
        for bytes in [
            &[][..],
            &[0x00][..],
            &[0xff][..],
            &[0x00, 0x01, 0xab, 0xcd, 0xef][..],
            b"arbitrary payload bytes".as_slice(),
        ] {
            assert_eq!(decode_base64(&encode_base64(bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn hex_encoding_is_lowercase_two_chars_per_byte() {
        assert_eq!(encode_hex(&[0xAB, 0x01]), "ab01");
    }

    #[test]
    fn strict_hex_rejects_odd_length() {
        assert!(matches!(decode_hex("abc"), Err(FormatError::Hex(_))));
    }

    #[test]
    fn strict_hex_rejects_non_hex_characters() {
        assert!(matches!(decode_hex("zz"), Err(FormatError::Hex(_))));
    }

    #[test]
    fn strict_hex_accepts_uppercase() {
        assert_eq!(decode_hex("AB01").unwrap(), vec![0xab, 0x01]);
    }

    #[test]
    fn base64_rejects_invalid_alphabet() {
        assert!(matches!(
            decode_base64("not base64!"),
            Err(FormatError::Base64(_))
        ));
    }

    #[test]
    fn lenient_hex_decodes_clean_input() {
        assert_eq!(decode_hex_lenient("ab01ff"), vec![0xab, 0x01, 0xff]);
        assert_eq!(decode_hex_lenient("AB01FF"), vec![0xab, 0x01, 0xff]);
    }

    #[test]
    fn lenient_hex_returns_empty_for_non_matching_input() {
        assert_eq!(decode_hex_lenient("zz"), Vec::<u8>::new());
        assert_eq!(decode_hex_lenient(""), Vec::<u8>::new());
    }

    #[test]
    fn lenient_hex_drops_unpaired_trailing_digit() {
        assert_eq!(decode_hex_lenient("ab0"), vec![0xab]);
    }

    #[test]
    fn lenient_hex_skips_interleaved_garbage() {
        // Pairs are adjacent digits only; a separator breaks the pair.
        assert_eq!(decode_hex_lenient("ab:cd"), vec![0xab, 0xcd]);
        assert_eq!(decode_hex_lenient("a:b"), Vec::<u8>::new());
    }
}
