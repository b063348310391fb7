//! `mimepart`: a lazy view over one MIME part of a raw email message.
//!
//! A [`MimePart`] carries the part's metadata (headers, content type,
//! disposition, byte offsets) and a handle to the message source, which may
//! be a shared seekable stream or an in-memory buffer. Content is read and
//! decoded on demand: transfer-encoding removal, then charset conversion for
//! bodies, and RFC 2047 encoded-word decoding for headers.

pub mod config;
pub mod decode;
pub mod error;
pub mod logging;
pub mod model;
pub mod parser;
pub mod part;
pub mod source;

pub use error::{MimeError, Result};
pub use part::MimePart;
