//! Centralized error types for mimepart.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mimepart library.
///
/// Absence is never an error here: missing fields, headers and empty byte
/// ranges are reported as `None` or empty content by the accessors.
#[derive(Error, Debug)]
pub enum MimeError {
    /// I/O error while reading from the message source.
    #[error("I/O error reading '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// A transfer-encoding was rejected by a strict decoder.
    #[error("Unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    /// A charset was rejected by a strict converter.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Content could not be decoded.
    #[error("Decoding error: {0}")]
    Decode(String),
}

/// Convenience alias for `Result<T, MimeError>`.
pub type Result<T> = std::result::Result<T, MimeError>;

impl MimeError {
    /// Create an `Io` variant from a description of the source and an `io::Error`.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<std::io::Error> for MimeError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            context: "<stream>".to_string(),
            source,
        }
    }
}

impl From<base64::DecodeError> for MimeError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Decode(format!("base64: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MimeError::UnsupportedCharset("x-klingon".into());
        assert_eq!(err.to_string(), "Unsupported charset: x-klingon");

        let err = MimeError::io(
            "message.eml",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"),
        );
        assert_eq!(err.to_string(), "I/O error reading 'message.eml': eof");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MimeError = io_err.into();
        assert!(matches!(err, MimeError::Io { .. }));
        assert!(err.to_string().contains("<stream>"));
    }
}
