//! Charset conversion to UTF-8 via `encoding_rs`.

use encoding_rs::Encoding;
use tracing::warn;

use super::CharsetConverter;
use crate::error::{MimeError, Result};

/// Charset assumed when a part declares none.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Default [`CharsetConverter`] backed by the WHATWG label table.
///
/// Missing and unknown labels fall back to the default charset. Malformed
/// input becomes U+FFFD.
#[derive(Debug, Clone)]
pub struct EncodingRsConverter {
    default: &'static Encoding,
    strict: bool,
}

impl Default for EncodingRsConverter {
    fn default() -> Self {
        Self {
            default: encoding_rs::UTF_8,
            strict: false,
        }
    }
}

impl EncodingRsConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `label` as the fallback charset. An unknown label keeps UTF-8.
    pub fn with_default_charset(mut self, label: &str) -> Self {
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => self.default = encoding,
            None => warn!(charset = label, "Unknown default charset, keeping UTF-8"),
        }
        self
    }

    /// Fail on unknown labels instead of falling back.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The encoding used for a missing or unknown label.
    pub fn default_encoding(&self) -> &'static Encoding {
        self.default
    }
}

impl CharsetConverter for EncodingRsConverter {
    fn convert(&self, bytes: &[u8], charset: Option<&str>) -> Result<String> {
        let label = charset.map(str::trim).filter(|c| !c.is_empty());
        let encoding = match label {
            None => self.default,
            Some(label) => match Encoding::for_label(label.as_bytes()) {
                Some(encoding) => encoding,
                None if self.strict => {
                    return Err(MimeError::UnsupportedCharset(label.to_string()))
                }
                None => {
                    warn!(
                        charset = label,
                        fallback = self.default.name(),
                        "Unknown charset, using default"
                    );
                    self.default
                }
            },
        };

        if encoding == encoding_rs::UTF_8 {
            return Ok(String::from_utf8_lossy(bytes).into_owned());
        }
        let (decoded, _, _) = encoding.decode(bytes);
        Ok(decoded.into_owned())
    }
}
