//! A single MIME part: typed metadata plus on-demand access to its bytes.
//!
//! A part never holds its content. Body and full-part bytes are read from
//! the shared [`PartSource`] on every call and decoded through the part's
//! [`Decoders`]. Nothing is cached, so a replaced collaborator takes effect
//! on the next call.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::config::DecodingConfig;
use crate::decode::{CharsetConverter, Decoders, HeaderWordDecoder, TransferDecoder};
use crate::error::Result;
use crate::model::header::HeaderMap;
use crate::model::metadata::{FieldValue, PartMetadata};
use crate::source::PartSource;

/// One node of a MIME message tree.
#[derive(Debug, Clone)]
pub struct MimePart {
    id: String,
    metadata: PartMetadata,
    source: PartSource,
    decoders: Decoders,
}

impl MimePart {
    /// Create a part with the standard decoders.
    ///
    /// `id` is an opaque, non-empty token naming the part within its message.
    /// Offsets are not checked here; an inverted range reads as empty.
    pub fn new(
        id: impl Into<String>,
        metadata: PartMetadata,
        source: impl Into<PartSource>,
    ) -> Self {
        Self::with_decoders(id, metadata, source, Decoders::default())
    }

    /// Create a part whose standard decoders follow `config`.
    pub fn with_config(
        id: impl Into<String>,
        metadata: PartMetadata,
        source: impl Into<PartSource>,
        config: &DecodingConfig,
    ) -> Self {
        Self::with_decoders(id, metadata, source, Decoders::standard(config))
    }

    pub fn with_decoders(
        id: impl Into<String>,
        metadata: PartMetadata,
        source: impl Into<PartSource>,
        decoders: Decoders,
    ) -> Self {
        let id = id.into();
        debug_assert!(!id.is_empty(), "part id must not be empty");
        Self {
            id,
            metadata,
            source: source.into(),
            decoders,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &PartSource {
        &self.source
    }

    // ── Metadata ────────────────────────────────────────────────────

    pub fn metadata(&self) -> &PartMetadata {
        &self.metadata
    }

    /// Edit top-level fields in place.
    pub fn metadata_mut(&mut self) -> &mut PartMetadata {
        &mut self.metadata
    }

    /// Replace the whole metadata, offsets included.
    pub fn set_metadata(&mut self, metadata: PartMetadata) {
        self.metadata = metadata;
    }

    /// A top-level metadata field by wire name (`"content-type"`,
    /// `"starting-pos-body"`, ...).
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.metadata.field(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.metadata.has_field(name)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata.content_type()
    }

    pub fn content_disposition(&self) -> Option<&str> {
        self.metadata.content_disposition()
    }

    pub fn content_id(&self) -> Option<&str> {
        self.metadata.content_id()
    }

    pub fn content_name(&self) -> Option<&str> {
        self.metadata.content_name()
    }

    pub fn disposition_filename(&self) -> Option<&str> {
        self.metadata.disposition_filename()
    }

    pub fn transfer_encoding(&self) -> Option<&str> {
        self.metadata.transfer_encoding()
    }

    pub fn charset(&self) -> Option<&str> {
        self.metadata.charset()
    }

    pub fn starting_position(&self) -> u64 {
        self.metadata.offsets().start
    }

    pub fn ending_position(&self) -> u64 {
        self.metadata.offsets().end
    }

    pub fn starting_position_body(&self) -> u64 {
        self.metadata.offsets().body_start
    }

    pub fn ending_position_body(&self) -> u64 {
        self.metadata.offsets().body_end
    }

    // ── Headers ─────────────────────────────────────────────────────

    /// All headers, exactly as stored.
    pub fn raw_headers(&self) -> &HeaderMap {
        self.metadata.headers()
    }

    /// First occurrence of a header, undecoded. Case-insensitive.
    ///
    /// Repeated headers resolve to the earliest one; use
    /// [`raw_headers`](Self::raw_headers) to see them all.
    pub fn raw_header(&self, name: &str) -> Option<&str> {
        self.metadata.headers().get_first(name)
    }

    /// All headers with encoded-words decoded, every occurrence included.
    pub fn headers(&self) -> Result<HeaderMap> {
        let words = &self.decoders.header_words;
        let mut decoded = HeaderMap::new();
        for (name, value) in self.metadata.headers().iter() {
            decoded.insert(name, value.try_map(|v| words.decode(v))?);
        }
        Ok(decoded)
    }

    /// First occurrence of a header with encoded-words decoded.
    pub fn header(&self, name: &str) -> Result<Option<String>> {
        self.raw_header(name)
            .map(|raw| self.decoders.header_words.decode(raw))
            .transpose()
    }

    // ── Content ─────────────────────────────────────────────────────

    /// Bytes `[start, end)` of the message source. Empty when `start >= end`.
    pub fn extract_range(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        self.source.read_range(start, end)
    }

    /// Headers and body as originally serialized.
    pub fn full_part_bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.extract_range(self.starting_position(), self.ending_position())
    }

    /// The body, still transfer-encoded.
    pub fn body_bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.extract_range(self.starting_position_body(), self.ending_position_body())
    }

    /// Whether this is displayable `text/<subtype>`.
    ///
    /// True when the disposition is missing, empty or exactly `inline`, and
    /// the content type is exactly `text/<subtype>`. No case folding.
    pub fn is_text_subtype(&self, subtype: &str) -> bool {
        let displayable = matches!(self.content_disposition(), None | Some("") | Some("inline"));
        displayable
            && self
                .content_type()
                .and_then(|ct| ct.strip_prefix("text/"))
                .is_some_and(|st| st == subtype)
    }

    /// Body with transfer encoding removed, then converted from its charset.
    ///
    /// Collaborator errors are returned unchanged.
    pub fn decoded(&self) -> Result<String> {
        debug!(
            part = %self.id,
            encoding = self.transfer_encoding().unwrap_or_default(),
            charset = self.charset().unwrap_or_default(),
            "Decoding part body"
        );
        let body = self.body_bytes()?;
        let bytes = self
            .decoders
            .transfer
            .decode(&body, self.transfer_encoding())?;
        self.decoders.charset.convert(&bytes, self.charset())
    }

    // ── Collaborators ───────────────────────────────────────────────

    pub fn decoders(&self) -> &Decoders {
        &self.decoders
    }

    /// Replace the body charset converter.
    ///
    /// The header-word decoder keeps the converter it was built with.
    pub fn set_charset_converter(&mut self, converter: impl CharsetConverter + 'static) {
        self.decoders.charset = Arc::new(converter);
    }

    /// Replace the body transfer decoder.
    ///
    /// The header-word decoder keeps the transfer decoder it was built with.
    pub fn set_transfer_decoder(&mut self, decoder: impl TransferDecoder + 'static) {
        self.decoders.transfer = Arc::new(decoder);
    }

    pub fn set_header_word_decoder(&mut self, decoder: impl HeaderWordDecoder + 'static) {
        self.decoders.header_words = Arc::new(decoder);
    }
}
