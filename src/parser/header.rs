//! RFC 5322 header block handling: decoding, folding, and parameter splitting.

use crate::model::header::HeaderMap;

/// Parse a raw header block into a [`HeaderMap`].
///
/// Continuation lines are unfolded, names lowercased, and repeated headers
/// kept in message order. Values are left raw (encoded-words intact).
pub fn parse_header_block(raw_headers: &[u8]) -> HeaderMap {
    let text = decode_header_bytes(raw_headers);
    let mut headers = HeaderMap::new();
    for (name, value) in unfold_headers(&text) {
        headers.append(&name, value);
    }
    headers
}

/// Decode raw header bytes to a string.
///
/// Tries UTF-8 first, then falls back to Windows-1252 (which accepts every byte).
fn decode_header_bytes(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Join continuation lines (starting with space or tab) onto the previous header.
///
/// Returns `(lowercase_name, value)` pairs in order.
fn unfold_headers(text: &str) -> Vec<(String, String)> {
    let mut result: Vec<(String, String)> = Vec::new();

    for line in text.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = result.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim());
            }
        } else if let Some(colon_pos) = line.find(':') {
            let name = line[..colon_pos].trim().to_lowercase();
            let value = line[colon_pos + 1..].trim().to_string();
            result.push((name, value));
        }
        // Lines without a colon and not a continuation are silently skipped
    }

    result
}

/// Split a structured header value into its bare value and parameters.
///
/// `text/plain; charset="utf-8"; name=a.txt` →
/// `("text/plain", [("charset", "utf-8"), ("name", "a.txt")])`.
/// Parameter names are lowercased, quotes and backslash escapes removed.
/// RFC 2231 extended values (`name*=utf-8''a%20b`) are decoded.
pub fn split_parameters(value: &str) -> (&str, Vec<(String, String)>) {
    let (bare, rest) = match value.find(';') {
        Some(pos) => (&value[..pos], &value[pos + 1..]),
        None => (value, ""),
    };

    let mut params = Vec::new();
    for segment in split_unquoted(rest) {
        let Some(eq) = segment.find('=') else {
            continue;
        };
        let name = segment[..eq].trim().to_ascii_lowercase();
        let raw = segment[eq + 1..].trim();
        if name.is_empty() {
            continue;
        }
        match name.strip_suffix('*') {
            Some(base) => params.push((base.to_string(), decode_extended_value(raw))),
            None => params.push((name, unquote(raw))),
        }
    }

    (bare.trim(), params)
}

/// Split on `;` outside of double quotes.
fn split_unquoted(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unquote(s: &str) -> String {
    let Some(inner) = s.strip_prefix('"') else {
        return s.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Decode `charset'lang'percent-encoded` (RFC 2231).
fn decode_extended_value(raw: &str) -> String {
    let raw = unquote(raw);
    let mut pieces = raw.splitn(3, '\'');
    let (charset, encoded) = match (pieces.next(), pieces.next(), pieces.next()) {
        (Some(charset), Some(_lang), Some(encoded)) => (charset, encoded),
        _ => ("", raw.as_str()),
    };

    let mut bytes = Vec::with_capacity(encoded.len());
    let src = encoded.as_bytes();
    let mut i = 0;
    while i < src.len() {
        if src[i] == b'%' {
            if let Some(byte) = src
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
            {
                bytes.push(byte);
                i += 3;
                continue;
            }
        }
        bytes.push(src[i]);
        i += 1;
    }

    match encoding_rs::Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => encoding.decode(&bytes).0.into_owned(),
        None => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Find the byte offset where headers end (position of the first blank line).
///
/// Returns `(header_end, body_start)`; `None` when there is no blank line.
/// Data that opens with a blank line has no headers at all.
pub fn find_header_end(data: &[u8]) -> Option<(usize, usize)> {
    if data.starts_with(b"\r\n") {
        return Some((0, 2));
    }
    if data.starts_with(b"\n") {
        return Some((0, 1));
    }
    for i in 0..data.len().saturating_sub(1) {
        if data[i] == b'\n' && data[i + 1] == b'\n' {
            return Some((i, i + 2));
        }
        if i + 3 < data.len()
            && data[i] == b'\r'
            && data[i + 1] == b'\n'
            && data[i + 2] == b'\r'
            && data[i + 3] == b'\n'
        {
            return Some((i, i + 4));
        }
    }
    None
}
