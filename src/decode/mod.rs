//! Decoding collaborators: transfer-encoding removal, charset conversion,
//! and header encoded-word decoding.
//!
//! Each stage is a small trait so a [`MimePart`](crate::part::MimePart) can
//! have any of them swapped out after construction. The defaults never fail
//! on unknown names: an unknown transfer encoding passes bytes through and an
//! unknown charset falls back to [`charset::DEFAULT_CHARSET`].

pub mod charset;
pub mod header;
pub mod transfer;

use std::sync::Arc;

use crate::config::DecodingConfig;
use crate::error::Result;

pub use charset::EncodingRsConverter;
pub use header::Rfc2047Decoder;
pub use transfer::StandardTransferDecoder;

/// Removes a Content-Transfer-Encoding.
pub trait TransferDecoder: Send + Sync {
    /// `encoding` is the raw field value; `None` means none was declared.
    fn decode(&self, bytes: &[u8], encoding: Option<&str>) -> Result<Vec<u8>>;
}

/// Converts bytes in a named charset to text.
pub trait CharsetConverter: Send + Sync {
    /// `charset` is the raw label; `None` means none was declared.
    fn convert(&self, bytes: &[u8], charset: Option<&str>) -> Result<String>;
}

/// Resolves RFC 2047 encoded-words in a raw header value.
pub trait HeaderWordDecoder: Send + Sync {
    fn decode(&self, raw_value: &str) -> Result<String>;
}

impl<F> TransferDecoder for F
where
    F: Fn(&[u8], Option<&str>) -> Result<Vec<u8>> + Send + Sync,
{
    fn decode(&self, bytes: &[u8], encoding: Option<&str>) -> Result<Vec<u8>> {
        self(bytes, encoding)
    }
}

impl<F> CharsetConverter for F
where
    F: Fn(&[u8], Option<&str>) -> Result<String> + Send + Sync,
{
    fn convert(&self, bytes: &[u8], charset: Option<&str>) -> Result<String> {
        self(bytes, charset)
    }
}

impl<F> HeaderWordDecoder for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn decode(&self, raw_value: &str) -> Result<String> {
        self(raw_value)
    }
}

/// The three collaborators a part decodes with.
#[derive(Clone)]
pub struct Decoders {
    pub charset: Arc<dyn CharsetConverter>,
    pub transfer: Arc<dyn TransferDecoder>,
    pub header_words: Arc<dyn HeaderWordDecoder>,
}

impl Decoders {
    /// Standard collaborators, with the header-word decoder wired to the
    /// same transfer decoder and charset converter.
    pub fn standard(config: &DecodingConfig) -> Self {
        let charset: Arc<dyn CharsetConverter> = Arc::new(
            EncodingRsConverter::new()
                .with_default_charset(&config.default_charset)
                .strict(config.strict),
        );
        let transfer: Arc<dyn TransferDecoder> =
            Arc::new(StandardTransferDecoder::new().strict(config.strict));
        let header_words: Arc<dyn HeaderWordDecoder> =
            Arc::new(Rfc2047Decoder::new(transfer.clone(), charset.clone()));
        Self {
            charset,
            transfer,
            header_words,
        }
    }
}

impl Default for Decoders {
    fn default() -> Self {
        Self::standard(&DecodingConfig::default())
    }
}

impl std::fmt::Debug for Decoders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoders").finish_non_exhaustive()
    }
}
