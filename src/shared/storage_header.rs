use crc32fast::Hasher as Crc32Hasher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryHeader {
    pub magic: [u8; 8],
    pub version: u16,
    pub flags: u16,
    pub reserved: u32,
    pub header_crc32: u32,
}

impl BinaryHeader {
    pub const LEN_WITHOUT_CRC: usize = 8 + 2 + 2 + 4;
    pub const TOTAL_LEN: usize = Self::LEN_WITHOUT_CRC + 4;

    pub fn new(magic: [u8; 8], version: u16, flags: u16) -> Self {
        let mut header = Self {
            magic,
            version,
            flags,
            reserved: 0,
            header_crc32: 0,
        };
        header.header_crc32 = header.compute_crc32();
        header
    }

    fn compute_crc32(&self) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(&self.magic);
        hasher.update(&self.version.to_le_bytes());
        hasher.update(&self.flags.to_le_bytes());
        hasher.update(&self.reserved.to_le_bytes());
        hasher.finalize()
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_all(&self.version.to_le_bytes())?;
        w.write_all(&self.flags.to_le_bytes())?;
        w.write_all(&self.reserved.to_le_bytes())?;
        w.write_all(&self.header_crc32.to_le_bytes())?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: R) -> std::io::Result<Self> {
        Self::read_from_with(r, true)
    }

    pub fn read_from_with<R: Read>(mut r: R, verify_crc: bool) -> std::io::Result<Self> {
        let mut raw = [0u8; Self::TOTAL_LEN];
        r.read_exact(&mut raw)?;

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&raw[0..8]);
        let version = u16::from_le_bytes([raw[8], raw[9]]);
        let flags = u16::from_le_bytes([raw[10], raw[11]]);
        let reserved = u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]);
        let header_crc32 = u32::from_le_bytes([raw[16], raw[17], raw[18], raw[19]]);

        let hdr = Self {
            magic,
            version,
            flags,
            reserved,
            header_crc32,
        };
        if verify_crc && hdr.compute_crc32() != header_crc32 {
            return Err(invalid_data("header CRC mismatch"));
        }
        Ok(hdr)
    }
}

pub enum FileKind {
    StreamSegment,
}

impl FileKind {
    pub const fn magic(&self) -> [u8; 8] {
        match self {
            FileKind::StreamSegment => *b"SEGSTRM\0",
        }
    }
}

/// Length of the marker that precedes every blocklet.
pub const SYNC_MARKER_LEN: usize = 16;

pub const STREAM_FILE_VERSION: u16 = 1;

const MAX_FILE_HEADER_LEN: u32 = 16 * 1024 * 1024;

/// Leading header of a streaming segment file.
///
/// The sync marker is serialized inside this header, so a scan that starts at
/// byte 0 sees one marker occurrence before the first blocklet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFileHeader {
    pub sync_marker: Vec<u8>,
    pub column_count: u32,
    pub column_names: Vec<String>,
    pub created_at: u64,
}

impl StreamFileHeader {
    pub fn new(column_names: Vec<String>) -> Self {
        let mut sync_marker = vec![0u8; SYNC_MARKER_LEN];
        rand::thread_rng().fill_bytes(&mut sync_marker);
        Self::with_marker(sync_marker, column_names)
    }

    pub fn with_marker(sync_marker: Vec<u8>, column_names: Vec<String>) -> Self {
        Self {
            sync_marker,
            column_count: column_names.len() as u32,
            column_names,
            created_at: chrono::Utc::now().timestamp_millis().max(0) as u64,
        }
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        BinaryHeader::new(FileKind::StreamSegment.magic(), STREAM_FILE_VERSION, 0)
            .write_to(&mut w)?;
        let body = bincode::serialize(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        w.write_all(&(body.len() as u32).to_be_bytes())?;
        w.write_all(&body)?;
        Ok(())
    }

    pub fn read_from<R: Read>(r: R, verify_crc: bool) -> std::io::Result<Self> {
        Self::read_with_layout(r, verify_crc).map(|(header, _)| header)
    }

    /// Reads the header and reports where it ends and where its embedded
    /// copy of the sync marker begins.
    pub fn read_with_layout<R: Read>(
        mut r: R,
        verify_crc: bool,
    ) -> std::io::Result<(Self, HeaderLayout)> {
        let header = BinaryHeader::read_from_with(&mut r, verify_crc)?;
        if header.magic != FileKind::StreamSegment.magic() {
            return Err(invalid_data("invalid magic for stream segment"));
        }
        if header.version != STREAM_FILE_VERSION {
            return Err(invalid_data("unsupported stream segment version"));
        }

        let mut len = [0u8; 4];
        r.read_exact(&mut len)?;
        let len = u32::from_be_bytes(len);
        if len > MAX_FILE_HEADER_LEN {
            return Err(invalid_data("stream file header too large"));
        }
        let mut body = vec![0u8; len as usize];
        r.read_exact(&mut body)?;
        let parsed: StreamFileHeader = bincode::deserialize(&body)
            .map_err(|e| invalid_data(&format!("stream file header: {e}")))?;

        if parsed.sync_marker.len() != SYNC_MARKER_LEN {
            return Err(invalid_data("sync marker has wrong length"));
        }
        if parsed.column_count as usize != parsed.column_names.len() {
            return Err(invalid_data("column count disagrees with column names"));
        }

        let body_start = (BinaryHeader::TOTAL_LEN + 4) as u64;
        let marker_offset = body
            .windows(SYNC_MARKER_LEN)
            .position(|w| w == parsed.sync_marker.as_slice())
            .map(|p| body_start + p as u64)
            .ok_or_else(|| invalid_data("sync marker missing from header body"))?;
        let layout = HeaderLayout {
            len: body_start + body.len() as u64,
            marker_offset,
        };
        Ok((parsed, layout))
    }
}

/// Byte layout of the header region at the start of a segment file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    pub len: u64,
    pub marker_offset: u64,
}

fn invalid_data(msg: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.to_string())
}
