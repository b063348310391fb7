//! Metadata for a single, already isolated part.
//!
//! Splitting a message into parts is the tokenizer's job. This covers the
//! last step for callers that already know where one part starts and ends.

use crate::model::metadata::{PartMetadata, PartOffsets};
use crate::parser::header;

/// Build [`PartMetadata`] for `raw`, which sits at `base_offset` in the source.
///
/// A part without a blank line is treated as all headers and no body; one
/// that opens with a blank line has no headers.
pub fn scan_part(raw: &[u8], base_offset: u64) -> PartMetadata {
    let len = raw.len() as u64;
    let (header_end, body_start) = header::find_header_end(raw)
        .map(|(h, b)| (h as u64, b as u64))
        .unwrap_or((len, len));

    let headers = header::parse_header_block(&raw[..header_end as usize]);
    PartMetadata::from_headers(headers).with_offsets(PartOffsets::new(
        base_offset,
        base_offset + len,
        base_offset + body_start,
        base_offset + len,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_part_offsets() {
        let raw = b"Content-Type: text/plain\r\n\r\nHello\r\n";
        let meta = scan_part(raw, 100);
        let offsets = meta.offsets();
        assert_eq!(offsets, PartOffsets::new(100, 135, 128, 135));
        assert_eq!(meta.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_scan_part_without_body() {
        let raw = b"Content-Type: text/plain\n";
        let meta = scan_part(raw, 0);
        let offsets = meta.offsets();
        assert_eq!(offsets.body_start, offsets.body_end);
        assert_eq!(meta.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_scan_part_without_headers() {
        let raw = b"\r\nhello body\r\n";
        let meta = scan_part(raw, 40);
        assert!(meta.headers().is_empty());
        assert_eq!(meta.offsets(), PartOffsets::new(40, 54, 42, 54));
    }
}
