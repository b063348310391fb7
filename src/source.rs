//! Message sources: positioned reads over a shared stream or an in-memory buffer.
//!
//! Every part of a message shares one source. Offsets are absolute byte
//! positions into that source and ranges are half-open `[start, end)`.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use memmap2::Mmap;
use tracing::debug;

use crate::error::{MimeError, Result};

/// Anything that can back a [`SharedStream`].
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// A seekable stream shared by all parts of one message.
///
/// The read position is shared mutable state, so the lock is held for the
/// whole seek+read. Sibling parts may be read from different threads.
#[derive(Clone)]
pub struct SharedStream {
    label: Arc<str>,
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
}

impl SharedStream {
    /// Wrap an arbitrary reader.
    pub fn new(reader: impl ReadSeek + 'static) -> Self {
        Self::with_label("<stream>", reader)
    }

    /// Wrap a reader, naming it for error messages and logs.
    pub fn with_label(label: impl Into<String>, reader: impl ReadSeek + 'static) -> Self {
        let label: String = label.into();
        Self {
            label: Arc::from(label),
            inner: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// Open a message file for random-access reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MimeError::FileNotFound(path.to_path_buf())
            } else {
                MimeError::io(path.display().to_string(), e)
            }
        })?;
        Ok(Self::with_label(path.display().to_string(), file))
    }

    /// Seek to `start` and read up to `end - start` bytes.
    ///
    /// Fewer bytes are returned if the stream ends first.
    pub fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let length = end - start;
        debug!(
            source = %self.label,
            offset = start,
            length,
            "Reading range from stream"
        );

        // A poisoned lock only means another reader panicked mid-read; the
        // next seek resets the position anyway.
        let mut stream = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        stream
            .seek(SeekFrom::Start(start))
            .map_err(|e| MimeError::io(&*self.label, e))?;

        let mut buf = Vec::with_capacity(usize::try_from(length).unwrap_or(0).min(1 << 20));
        stream
            .by_ref()
            .take(length)
            .read_to_end(&mut buf)
            .map_err(|e| MimeError::io(&*self.label, e))?;
        Ok(buf)
    }
}

impl fmt::Debug for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStream")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// An immutable buffer holding the entire raw message.
#[derive(Clone)]
pub struct SharedBuffer {
    bytes: Arc<dyn AsRef<[u8]> + Send + Sync>,
}

impl SharedBuffer {
    /// Take ownership of any byte container.
    pub fn new(bytes: impl AsRef<[u8]> + Send + Sync + 'static) -> Self {
        Self {
            bytes: Arc::new(bytes),
        }
    }

    /// Map a message file into memory read-only.
    pub fn map_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MimeError::FileNotFound(path.to_path_buf())
            } else {
                MimeError::io(path.display().to_string(), e)
            }
        })?;
        // SAFETY: the mapping is read-only. Truncating the file while it is
        // mapped is the caller's problem, same as for any mmap-backed reader.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| MimeError::io(path.display().to_string(), e))?;
        Ok(Self::new(map))
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        (*self.bytes).as_ref()
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Borrow `[start, end)`, clamped to the buffer length.
    pub fn slice(&self, start: u64, end: u64) -> &[u8] {
        let bytes = self.as_bytes();
        let end = clamp_offset(end, bytes.len());
        let start = clamp_offset(start, bytes.len());
        if start >= end {
            return &[];
        }
        &bytes[start..end]
    }
}

fn clamp_offset(offset: u64, len: usize) -> usize {
    usize::try_from(offset).map_or(len, |o| o.min(len))
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("len", &self.len())
            .finish()
    }
}

impl From<Vec<u8>> for SharedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for SharedBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl From<String> for SharedBuffer {
    fn from(text: String) -> Self {
        Self::new(text.into_bytes())
    }
}

/// Where a part's bytes live. Chosen once when the part is built.
#[derive(Debug, Clone)]
pub enum PartSource {
    /// Shared seekable stream, owned by the message.
    Stream(SharedStream),
    /// The whole raw message in memory.
    Buffer(SharedBuffer),
}

impl PartSource {
    /// Read the half-open range `[start, end)`.
    ///
    /// An empty or inverted range yields empty content, not an error.
    /// Buffer-backed reads borrow; stream-backed reads allocate.
    pub fn read_range(&self, start: u64, end: u64) -> Result<Cow<'_, [u8]>> {
        if start >= end {
            return Ok(Cow::Borrowed(&[]));
        }
        match self {
            PartSource::Stream(stream) => stream.read_range(start, end).map(Cow::Owned),
            PartSource::Buffer(buffer) => Ok(Cow::Borrowed(buffer.slice(start, end))),
        }
    }
}

impl From<SharedStream> for PartSource {
    fn from(stream: SharedStream) -> Self {
        PartSource::Stream(stream)
    }
}

impl From<SharedBuffer> for PartSource {
    fn from(buffer: SharedBuffer) -> Self {
        PartSource::Buffer(buffer)
    }
}

impl From<Vec<u8>> for PartSource {
    fn from(bytes: Vec<u8>) -> Self {
        PartSource::Buffer(SharedBuffer::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RAW: &[u8] = b"Subject: Hi\r\n\r\nHello, world\r\n";

    #[test]
    fn test_buffer_range() {
        let source = PartSource::from(RAW.to_vec());
        let bytes = source.read_range(15, 27).unwrap();
        assert_eq!(&*bytes, b"Hello, world");
    }

    #[test]
    fn test_stream_range_matches_buffer() {
        let stream = PartSource::Stream(SharedStream::new(Cursor::new(RAW.to_vec())));
        let buffer = PartSource::from(RAW.to_vec());
        for (start, end) in [(0, 11), (15, 27), (3, 4), (0, RAW.len() as u64)] {
            assert_eq!(
                stream.read_range(start, end).unwrap(),
                buffer.read_range(start, end).unwrap()
            );
        }
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let stream = PartSource::Stream(SharedStream::new(Cursor::new(RAW.to_vec())));
        let buffer = PartSource::from(RAW.to_vec());
        for (start, end) in [(5, 5), (10, 3), (u64::MAX, 0)] {
            assert!(stream.read_range(start, end).unwrap().is_empty());
            assert!(buffer.read_range(start, end).unwrap().is_empty());
        }
    }

    #[test]
    fn test_range_past_end_is_truncated() {
        let stream = PartSource::Stream(SharedStream::new(Cursor::new(RAW.to_vec())));
        let buffer = PartSource::from(RAW.to_vec());
        let len = RAW.len() as u64;
        assert_eq!(&*stream.read_range(len - 2, len + 100).unwrap(), b"\r\n");
        assert_eq!(&*buffer.read_range(len - 2, len + 100).unwrap(), b"\r\n");
        assert!(buffer.read_range(len + 1, len + 100).unwrap().is_empty());
    }

    #[test]
    fn test_interleaved_stream_reads() {
        let stream = SharedStream::new(Cursor::new(RAW.to_vec()));
        let other = stream.clone();
        assert_eq!(stream.read_range(15, 20).unwrap(), b"Hello");
        assert_eq!(other.read_range(0, 7).unwrap(), b"Subject");
        assert_eq!(stream.read_range(22, 27).unwrap(), b"world");
    }

    #[test]
    fn test_open_missing_file() {
        let err = SharedStream::open("/nonexistent/message.eml").unwrap_err();
        assert!(matches!(err, MimeError::FileNotFound(_)));
    }
}
