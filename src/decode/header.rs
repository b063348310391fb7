//! RFC 2047 encoded-word decoding for header values.

use std::sync::Arc;

use super::{CharsetConverter, HeaderWordDecoder, TransferDecoder};
use crate::error::Result;

/// Default [`HeaderWordDecoder`].
///
/// Byte decoding goes through the injected [`TransferDecoder`] and text
/// conversion through the injected [`CharsetConverter`], so replacing either
/// on a part changes header decoding too.
#[derive(Clone)]
pub struct Rfc2047Decoder {
    transfer: Arc<dyn TransferDecoder>,
    charset: Arc<dyn CharsetConverter>,
}

impl Rfc2047Decoder {
    pub fn new(transfer: Arc<dyn TransferDecoder>, charset: Arc<dyn CharsetConverter>) -> Self {
        Self { transfer, charset }
    }

    fn try_decode_one_word(&self, s: &str) -> Result<Option<DecodedWord>> {
        // Format: charset?encoding?encoded_text?=
        let Some(first_q) = s.find('?') else {
            return Ok(None);
        };
        let charset = &s[..first_q];

        let rest = &s[first_q + 1..];
        let Some(second_q) = rest.find('?') else {
            return Ok(None);
        };
        let encoding = &rest[..second_q];

        let rest2 = &rest[second_q + 1..];
        let Some(end) = rest2.find("?=") else {
            return Ok(None);
        };
        let encoded_text = &rest2[..end];

        if charset.is_empty() || charset.contains(char::is_whitespace) {
            return Ok(None);
        }
        // RFC 2231 language suffix: charset*lang
        let charset = charset.split('*').next().unwrap_or(charset);

        let bytes = if encoding.eq_ignore_ascii_case("B") {
            self.transfer.decode(encoded_text.as_bytes(), Some("base64"))?
        } else if encoding.eq_ignore_ascii_case("Q") {
            let spaced = encoded_text.replace('_', " ");
            self.transfer
                .decode(spaced.as_bytes(), Some("quoted-printable"))?
        } else {
            return Ok(None);
        };

        Ok(Some(DecodedWord {
            text: self.charset.convert(&bytes, Some(charset))?,
            consumed: first_q + 1 + second_q + 1 + end + 2,
        }))
    }
}

impl std::fmt::Debug for Rfc2047Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rfc2047Decoder").finish_non_exhaustive()
    }
}

struct DecodedWord {
    text: String,
    consumed: usize, // bytes consumed from the string *after* the initial "=?"
}

impl HeaderWordDecoder for Rfc2047Decoder {
    /// Decode every encoded-word in `input`.
    ///
    /// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
    ///
    /// Literal text is kept verbatim. Whitespace between two adjacent
    /// encoded-words is dropped (RFC 2047 §6.2). Tokens that do not parse
    /// as encoded-words are left as they are.
    fn decode(&self, input: &str) -> Result<String> {
        let mut result = String::with_capacity(input.len());
        let mut remaining = input;
        let mut last_was_encoded = false;

        while let Some(start) = remaining.find("=?") {
            let before = &remaining[..start];
            let after_start = &remaining[start + 2..];

            // The gap is only dropped once the next token proves to be a word.
            match self.try_decode_one_word(after_start)? {
                Some(decoded) => {
                    if !last_was_encoded || !before.trim().is_empty() {
                        result.push_str(before);
                    }
                    result.push_str(&decoded.text);
                    remaining = &after_start[decoded.consumed..];
                    last_was_encoded = true;
                }
                None => {
                    result.push_str(before);
                    result.push_str("=?");
                    remaining = after_start;
                    last_was_encoded = false;
                }
            }
        }

        result.push_str(remaining);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::charset::EncodingRsConverter;
    use crate::decode::transfer::StandardTransferDecoder;

    fn decoder() -> Rfc2047Decoder {
        Rfc2047Decoder::new(
            Arc::new(StandardTransferDecoder::new()),
            Arc::new(EncodingRsConverter::new()),
        )
    }

    fn decode(input: &str) -> String {
        decoder().decode(input).unwrap()
    }

    #[test]
    fn test_decode_base64_encoded_word() {
        assert_eq!(decode("=?UTF-8?B?SG9sYSBtdW5kbw==?="), "Hola mundo");
    }

    #[test]
    fn test_decode_q_encoded_word() {
        assert_eq!(decode("=?ISO-8859-1?Q?caf=E9?="), "café");
    }

    #[test]
    fn test_decode_multiple_encoded_words() {
        assert_eq!(decode("=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="), "Hola mundo");
    }

    #[test]
    fn test_decode_mixed_plain_and_encoded() {
        assert_eq!(decode("Re: =?UTF-8?B?SG9sYQ==?= there"), "Re: Hola there");
    }

    #[test]
    fn test_decode_mixed_charsets() {
        let input = "=?ISO-8859-1?Q?R=E9sum=E9?= and =?UTF-8?B?5bGx55Sw?=";
        assert_eq!(decode(input), "Résumé and 山田");
    }

    #[test]
    fn test_decode_q_underscore_is_space() {
        assert_eq!(decode("=?ISO-8859-1?Q?R=E9sum=E9_du_projet?="), "Résumé du projet");
    }

    #[test]
    fn test_language_suffix_ignored() {
        assert_eq!(decode("=?UTF-8*en?Q?hello?="), "hello");
    }

    #[test]
    fn test_malformed_words_left_verbatim() {
        assert_eq!(decode("price =? 5"), "price =? 5");
        assert_eq!(decode("=?UTF-8?X?abc?="), "=?UTF-8?X?abc?=");
        assert_eq!(decode("=?UTF-8?B?abc"), "=?UTF-8?B?abc");
    }

    #[test]
    fn test_space_before_malformed_word_kept() {
        assert_eq!(decode("=?UTF-8?Q?a?= =?bogus"), "a =?bogus");
        assert_eq!(
            decode("=?UTF-8?Q?a?= =?UTF-8?X?b?= =?UTF-8?Q?c?="),
            "a =?UTF-8?X?b?= c"
        );
    }

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(decode("Just a subject"), "Just a subject");
        assert_eq!(decode(""), "");
    }
}
