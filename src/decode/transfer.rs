//! Content-Transfer-Encoding removal (RFC 2045).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::debug;

use super::TransferDecoder;
use crate::error::{MimeError, Result};

/// Encoding assumed when a part declares none.
pub const IDENTITY_ENCODING: &str = "7bit";

/// Accepts missing or partial padding and stray trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The transfer encodings this crate knows how to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    /// Anything else. Passed through untouched.
    Unknown,
}

impl TransferEncoding {
    /// Resolve a Content-Transfer-Encoding value, case-insensitively.
    ///
    /// A missing value means [`IDENTITY_ENCODING`].
    pub fn from_name(name: Option<&str>) -> Self {
        let name = name.map(str::trim).unwrap_or(IDENTITY_ENCODING);
        if name.eq_ignore_ascii_case("base64") {
            TransferEncoding::Base64
        } else if name.eq_ignore_ascii_case("quoted-printable") {
            TransferEncoding::QuotedPrintable
        } else if name.eq_ignore_ascii_case("7bit") || name.is_empty() {
            TransferEncoding::SevenBit
        } else if name.eq_ignore_ascii_case("8bit") {
            TransferEncoding::EightBit
        } else if name.eq_ignore_ascii_case("binary") {
            TransferEncoding::Binary
        } else {
            TransferEncoding::Unknown
        }
    }
}

/// Default [`TransferDecoder`]: base64, quoted-printable, identity for the rest.
#[derive(Debug, Clone, Default)]
pub struct StandardTransferDecoder {
    strict: bool,
}

impl StandardTransferDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject malformed base64 and unknown encoding names instead of
    /// salvaging what decodes.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl TransferDecoder for StandardTransferDecoder {
    fn decode(&self, bytes: &[u8], encoding: Option<&str>) -> Result<Vec<u8>> {
        match TransferEncoding::from_name(encoding) {
            TransferEncoding::Base64 if self.strict => {
                let cleaned: Vec<u8> = bytes
                    .iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect();
                Ok(STANDARD.decode(cleaned)?)
            }
            TransferEncoding::Base64 => Ok(decode_base64_lenient(bytes)),
            TransferEncoding::QuotedPrintable => Ok(decode_quoted_printable(bytes)),
            TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
                Ok(bytes.to_vec())
            }
            TransferEncoding::Unknown if self.strict => Err(MimeError::UnsupportedEncoding(
                encoding.unwrap_or_default().trim().to_string(),
            )),
            TransferEncoding::Unknown => {
                debug!(
                    encoding = encoding.unwrap_or_default(),
                    "Unknown transfer encoding, passing content through"
                );
                Ok(bytes.to_vec())
            }
        }
    }
}

/// Decode base64, skipping anything outside the alphabet.
///
/// Padding ends a chunk, not the input: bodies that pad every line are
/// decoded chunk after chunk.
pub fn decode_base64_lenient(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() / 4 * 3 + 3);
    for chunk in input.split(|&b| b == b'=') {
        let mut cleaned: Vec<u8> = chunk
            .iter()
            .copied()
            .filter(|&b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
            .collect();
        // A single leftover symbol carries no complete byte.
        if cleaned.len() % 4 == 1 {
            cleaned.pop();
        }
        if let Ok(bytes) = LENIENT_BASE64.decode(&cleaned) {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// Decode quoted-printable (RFC 2045 §6.7).
///
/// Soft line breaks (`=` before LF or CRLF) are removed. Malformed escapes
/// are kept verbatim. Never fails.
pub fn decode_quoted_printable(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] != b'=' {
            result.push(input[i]);
            i += 1;
            continue;
        }
        match input.get(i + 1..) {
            Some([b'\n', ..]) => i += 2,
            Some([b'\r', b'\n', ..]) => i += 3,
            Some([hi, lo, ..]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                result.push((hex_value(*hi) << 4) | hex_value(*lo));
                i += 3;
            }
            _ => {
                result.push(b'=');
                i += 1;
            }
        }
    }
    result
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(TransferEncoding::from_name(None), TransferEncoding::SevenBit);
        assert_eq!(
            TransferEncoding::from_name(Some(" BASE64 ")),
            TransferEncoding::Base64
        );
        assert_eq!(
            TransferEncoding::from_name(Some("Quoted-Printable")),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(
            TransferEncoding::from_name(Some("x-uuencode")),
            TransferEncoding::Unknown
        );
    }

    #[test]
    fn test_base64_with_line_breaks() {
        let decoder = StandardTransferDecoder::new();
        let out = decoder
            .decode(b"SGVsbG8s\r\nIHdvcmxk\r\nIQ==\r\n", Some("base64"))
            .unwrap();
        assert_eq!(out, b"Hello, world!");
    }

    #[test]
    fn test_base64_missing_padding_and_garbage() {
        assert_eq!(decode_base64_lenient(b"SGVsbG8*"), b"Hello");
        assert_eq!(decode_base64_lenient(b"SGk"), b"Hi");
        assert_eq!(decode_base64_lenient(b""), b"");
    }

    #[test]
    fn test_base64_padded_per_line() {
        assert_eq!(decode_base64_lenient(b"SGk=\r\nSGk=\r\n"), b"HiHi");
        let decoder = StandardTransferDecoder::new();
        let out = decoder
            .decode(b"SGVsbG8=\nLCA=\nd29ybGQ=\n", Some("base64"))
            .unwrap();
        assert_eq!(out, b"Hello, world");
    }

    #[test]
    fn test_strict_rejects_unknown_encoding() {
        let decoder = StandardTransferDecoder::new().strict(true);
        let err = decoder.decode(b"raw", Some(" x-uuencode ")).unwrap_err();
        assert!(matches!(err, MimeError::UnsupportedEncoding(ref e) if e == "x-uuencode"));
        assert_eq!(decoder.decode(b"raw", None).unwrap(), b"raw");
    }

    #[test]
    fn test_strict_base64_rejects_garbage() {
        let decoder = StandardTransferDecoder::new().strict(true);
        let err = decoder.decode(b"SGVs*bG8=", Some("base64")).unwrap_err();
        assert!(matches!(err, MimeError::Decode(_)));
        assert_eq!(
            decoder.decode(b"SGVs\nbG8=", Some("base64")).unwrap(),
            b"Hello"
        );
    }

    #[test]
    fn test_quoted_printable() {
        assert_eq!(decode_quoted_printable(b"caf=E9"), b"caf\xe9");
        assert_eq!(decode_quoted_printable(b"foo=\r\nbar=\nbaz"), b"foobarbaz");
        assert_eq!(decode_quoted_printable(b"a=ZZb"), b"a=ZZb");
        assert_eq!(decode_quoted_printable(b"trailing="), b"trailing=");
        assert_eq!(decode_quoted_printable(b"x=3d=3D"), b"x==");
    }

    #[test]
    fn test_identity_and_unknown_pass_through() {
        let decoder = StandardTransferDecoder::new();
        for name in [None, Some("7bit"), Some("8bit"), Some("binary"), Some("x-bogus")] {
            assert_eq!(decoder.decode(b"=E9 raw", name).unwrap(), b"=E9 raw");
        }
    }
}
