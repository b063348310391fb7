//! Part metadata as handed over by the message tokenizer.
//!
//! Every top-level field has a typed getter and setter. Nested values (the
//! header map) are changed by taking them out, editing, and putting them back.
//! Offsets are fixed once the metadata is built; only a whole replacement of
//! the metadata can move them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::header::HeaderMap;
use crate::parser::header::split_parameters;

/// Byte offsets of a part inside the message source.
///
/// `start..end` covers headers and body, `body_start..body_end` the body
/// only. Ordering is not validated; an inverted pair reads as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartOffsets {
    pub start: u64,
    pub end: u64,
    pub body_start: u64,
    pub body_end: u64,
}

impl PartOffsets {
    pub fn new(start: u64, end: u64, body_start: u64, body_end: u64) -> Self {
        Self {
            start,
            end,
            body_start,
            body_end,
        }
    }
}

/// Names of the top-level metadata fields, as used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Headers,
    ContentType,
    ContentDisposition,
    ContentId,
    ContentName,
    DispositionFilename,
    TransferEncoding,
    Charset,
    StartingPos,
    EndingPos,
    StartingPosBody,
    EndingPosBody,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Headers,
        Field::ContentType,
        Field::ContentDisposition,
        Field::ContentId,
        Field::ContentName,
        Field::DispositionFilename,
        Field::TransferEncoding,
        Field::Charset,
        Field::StartingPos,
        Field::EndingPos,
        Field::StartingPosBody,
        Field::EndingPosBody,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Headers => "headers",
            Field::ContentType => "content-type",
            Field::ContentDisposition => "content-disposition",
            Field::ContentId => "content-id",
            Field::ContentName => "content-name",
            Field::DispositionFilename => "disposition-filename",
            Field::TransferEncoding => "transfer-encoding",
            Field::Charset => "charset",
            Field::StartingPos => "starting-pos",
            Field::EndingPos => "ending-pos",
            Field::StartingPosBody => "starting-pos-body",
            Field::EndingPosBody => "ending-pos-body",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or(())
    }
}

/// A borrowed metadata value returned by [`PartMetadata::field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Headers(&'a HeaderMap),
    Text(&'a str),
    Offset(u64),
}

impl<'a> FieldValue<'a> {
    pub fn as_text(&self) -> Option<&'a str> {
        match *self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_offset(&self) -> Option<u64> {
        match *self {
            FieldValue::Offset(o) => Some(o),
            _ => None,
        }
    }
}

/// Everything known about a part except its bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartMetadata {
    #[serde(default)]
    headers: HeaderMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_disposition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disposition_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transfer_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    charset: Option<String>,
    #[serde(default)]
    starting_pos: u64,
    #[serde(default)]
    ending_pos: u64,
    #[serde(default)]
    starting_pos_body: u64,
    #[serde(default)]
    ending_pos_body: u64,
}

impl PartMetadata {
    /// Metadata with the given headers and nothing else.
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Derive the typed fields from the part's own headers.
    ///
    /// Content-Type and Content-Disposition are reduced to their bare,
    /// lowercased value; `charset`, `name` and `filename` come from their
    /// parameters. Header values are used raw (encoded-words are kept).
    pub fn from_headers(headers: HeaderMap) -> Self {
        let mut meta = Self::new(HeaderMap::new());

        if let Some(ct) = headers.get_first("content-type") {
            let (value, params) = split_parameters(ct);
            meta.content_type = non_empty(value.to_ascii_lowercase());
            meta.charset = param(&params, "charset");
            meta.content_name = param(&params, "name");
        }
        if let Some(cd) = headers.get_first("content-disposition") {
            let (value, params) = split_parameters(cd);
            meta.content_disposition = non_empty(value.to_ascii_lowercase());
            meta.disposition_filename = param(&params, "filename");
        }
        meta.content_id = headers
            .get_first("content-id")
            .and_then(|v| non_empty(v.trim().to_string()));
        meta.transfer_encoding = headers
            .get_first("content-transfer-encoding")
            .and_then(|v| non_empty(v.trim().to_ascii_lowercase()));

        meta.headers = headers;
        meta
    }

    /// Set all four offsets.
    pub fn with_offsets(mut self, offsets: PartOffsets) -> Self {
        self.starting_pos = offsets.start;
        self.ending_pos = offsets.end;
        self.starting_pos_body = offsets.body_start;
        self.ending_pos_body = offsets.body_end;
        self
    }

    /// Look up a top-level field by its wire name.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let field = name.parse::<Field>().ok()?;
        match field {
            Field::Headers => Some(FieldValue::Headers(&self.headers)),
            Field::ContentType => text_field(&self.content_type),
            Field::ContentDisposition => text_field(&self.content_disposition),
            Field::ContentId => text_field(&self.content_id),
            Field::ContentName => text_field(&self.content_name),
            Field::DispositionFilename => text_field(&self.disposition_filename),
            Field::TransferEncoding => text_field(&self.transfer_encoding),
            Field::Charset => text_field(&self.charset),
            Field::StartingPos => Some(FieldValue::Offset(self.starting_pos)),
            Field::EndingPos => Some(FieldValue::Offset(self.ending_pos)),
            Field::StartingPosBody => Some(FieldValue::Offset(self.starting_pos_body)),
            Field::EndingPosBody => Some(FieldValue::Offset(self.ending_pos_body)),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, value: Option<String>) {
        self.content_type = value;
    }

    pub fn content_disposition(&self) -> Option<&str> {
        self.content_disposition.as_deref()
    }

    pub fn set_content_disposition(&mut self, value: Option<String>) {
        self.content_disposition = value;
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn set_content_id(&mut self, value: Option<String>) {
        self.content_id = value;
    }

    /// The `name` parameter of Content-Type.
    pub fn content_name(&self) -> Option<&str> {
        self.content_name.as_deref()
    }

    pub fn set_content_name(&mut self, value: Option<String>) {
        self.content_name = value;
    }

    /// The `filename` parameter of Content-Disposition.
    pub fn disposition_filename(&self) -> Option<&str> {
        self.disposition_filename.as_deref()
    }

    pub fn set_disposition_filename(&mut self, value: Option<String>) {
        self.disposition_filename = value;
    }

    pub fn transfer_encoding(&self) -> Option<&str> {
        self.transfer_encoding.as_deref()
    }

    pub fn set_transfer_encoding(&mut self, value: Option<String>) {
        self.transfer_encoding = value;
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_charset(&mut self, value: Option<String>) {
        self.charset = value;
    }

    pub fn offsets(&self) -> PartOffsets {
        PartOffsets {
            start: self.starting_pos,
            end: self.ending_pos,
            body_start: self.starting_pos_body,
            body_end: self.ending_pos_body,
        }
    }
}

fn text_field(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Text)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| non_empty(v.clone()))
}
