use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Byte range `[start, start + length)` of one segment file assigned to a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSplit {
    pub start: u64,
    pub length: u64,
}

impl StreamSplit {
    pub fn new(start: u64, length: u64) -> Self {
        Self { start, length }
    }

    /// Split covering a whole file of `len` bytes.
    pub fn whole(len: u64) -> Self {
        Self::new(0, len)
    }

    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.length)
    }
}

/// Opens the byte stream a scan reads from. Split assignment and file-system
/// access stay with the caller; the scan only asks for a fresh stream.
pub trait SegmentSource {
    type Stream: Read + Seek;

    fn open(&self) -> std::io::Result<Self::Stream>;

    /// Human-readable location used in logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileSegmentSource {
    path: PathBuf,
}

impl FileSegmentSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SegmentSource for FileSegmentSource {
    type Stream = File;

    fn open(&self) -> std::io::Result<File> {
        File::open(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Segment bytes already held in memory.
#[derive(Debug, Clone)]
pub struct MemorySegmentSource {
    bytes: Arc<[u8]>,
}

impl MemorySegmentSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl SegmentSource for MemorySegmentSource {
    type Stream = Cursor<Arc<[u8]>>;

    fn open(&self) -> std::io::Result<Self::Stream> {
        Ok(Cursor::new(Arc::clone(&self.bytes)))
    }

    fn describe(&self) -> String {
        format!("memory segment ({} bytes)", self.bytes.len())
    }
}
