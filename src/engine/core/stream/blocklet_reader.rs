use std::io::{ErrorKind, Read};

use tracing::{debug, trace};

use crate::engine::core::stream::BlockletHeader;
use crate::engine::errors::ScanError;

const MAX_BLOCKLET_HEADER_LEN: usize = 16 * 1024 * 1024;

/// Sequential reader over one split of a streaming segment.
///
/// Finds blocklet boundaries by scanning for the sync marker, frames the
/// header and payload that follow it, and exposes big-endian cursor
/// primitives over a buffered payload. A blocklet belongs to the split when
/// its marker starts before the split's end; its payload may run past it.
pub struct BlockletReader<R> {
    input: R,
    sync_marker: Vec<u8>,
    sync_buffer: Vec<u8>,
    /// Bytes consumed since the split start
    pos: u64,
    limit_start: u64,
    limit_end: u64,
    is_header_present: bool,
    is_already_sync: bool,
    payload_pending: bool,

    buffer: Vec<u8>,
    payload_len: usize,
    offset: usize,
    payload_loaded: bool,
    row_nums: usize,
    row_index: usize,
}

impl<R: Read> BlockletReader<R> {
    /// `input` must already be positioned at the split start. When
    /// `is_header_present` is set, the first marker found belongs to the file
    /// header region and is skipped once.
    pub fn new(sync_marker: Vec<u8>, input: R, limit: u64, is_header_present: bool) -> Self {
        let sync_len = sync_marker.len();
        Self {
            input,
            sync_buffer: vec![0u8; sync_len],
            sync_marker,
            pos: 0,
            limit_start: limit,
            limit_end: limit.saturating_add(sync_len as u64),
            is_header_present,
            is_already_sync: false,
            payload_pending: false,
            buffer: Vec::new(),
            payload_len: 0,
            offset: 0,
            payload_loaded: false,
            row_nums: 0,
            row_index: 0,
        }
    }

    /// Moves to the next marker-delimited blocklet owned by this split.
    pub fn next_blocklet(&mut self) -> Result<bool, ScanError> {
        if self.payload_pending {
            self.skip_blocklet_data(true)?;
        }
        self.payload_loaded = false;

        if self.pos >= self.limit_start {
            return Ok(false);
        }

        if self.is_already_sync {
            let mut marker = std::mem::take(&mut self.sync_buffer);
            let read = self.read_fully(&mut marker);
            self.sync_buffer = marker;
            let read = read?;
            if read == 0 {
                return Ok(false);
            }
            if read < self.sync_buffer.len() {
                return Err(ScanError::corruption(format!(
                    "truncated sync marker at split offset {}",
                    self.pos - read as u64
                )));
            }
            if self.sync_buffer != self.sync_marker {
                return Err(ScanError::corruption(format!(
                    "expected sync marker at split offset {}",
                    self.pos - self.sync_buffer.len() as u64
                )));
            }
        } else {
            self.is_already_sync = true;
            if !self.sync()? {
                return Ok(false);
            }
        }

        Ok(self.pos < self.limit_end)
    }

    /// Scans forward byte by byte until the marker is found.
    fn sync(&mut self) -> Result<bool, ScanError> {
        let sync_len = self.sync_marker.len();
        let mut window = std::mem::take(&mut self.sync_buffer);
        let read = self.read_fully(&mut window);
        self.sync_buffer = window;
        if read? < sync_len {
            return Ok(false);
        }

        let mut skip_header = false;
        let mut byte = [0u8; 1];
        let mut i: u64 = 0;
        while i < self.limit_start {
            let start = (i % sync_len as u64) as usize;
            let matched = (0..sync_len)
                .all(|j| self.sync_marker[j] == self.sync_buffer[(start + j) % sync_len]);
            if matched {
                if self.is_header_present && !skip_header {
                    skip_header = true;
                } else {
                    if tracing::enabled!(tracing::Level::DEBUG) {
                        debug!(
                            target: "segment_stream::stream",
                            marker_offset = i,
                            "Synchronized on blocklet marker"
                        );
                    }
                    return Ok(true);
                }
            }

            if self.read_fully(&mut byte)? == 0 {
                return Ok(false);
            }
            self.sync_buffer[start] = byte[0];
            i += 1;
        }
        Ok(false)
    }

    pub fn read_blocklet_header(&mut self) -> Result<BlockletHeader, ScanError> {
        let len = self.read_frame_len("blocklet header")?;
        if len > MAX_BLOCKLET_HEADER_LEN {
            return Err(ScanError::corruption(format!(
                "blocklet header length {len} exceeds limit"
            )));
        }
        let mut raw = vec![0u8; len];
        if self.read_fully(&mut raw)? < len {
            return Err(ScanError::corruption("failed to read blocklet header"));
        }
        let header = BlockletHeader::decode(&raw)
            .map_err(|e| ScanError::corruption(format!("malformed blocklet header: {e}")))?;

        self.row_nums = header.row_count as usize;
        self.row_index = 0;
        self.payload_pending = true;

        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(
                target: "segment_stream::stream",
                rows = header.row_count,
                payload_length = header.payload_length,
                has_index = header.min_max_index.is_some(),
                "Read blocklet header"
            );
        }
        Ok(header)
    }

    /// Buffers the payload of the current blocklet for row-wise decoding.
    pub fn read_blocklet_data(&mut self, header: &BlockletHeader) -> Result<(), ScanError> {
        let len = self.read_frame_len("blocklet data")?;
        if len != header.payload_length as usize {
            return Err(ScanError::corruption(format!(
                "payload length {} disagrees with header ({})",
                len, header.payload_length
            )));
        }
        self.buffer.resize(len, 0);
        let mut buffer = std::mem::take(&mut self.buffer);
        let read = self.read_fully(&mut buffer);
        self.buffer = buffer;
        if read? < len {
            return Err(ScanError::corruption("failed to read blocklet data"));
        }
        self.payload_len = len;
        self.offset = 0;
        self.payload_loaded = true;
        self.payload_pending = false;
        Ok(())
    }

    /// Advances past the payload without interpreting it. With `reset`, the
    /// row counters are cleared so no row of this blocklet is visited.
    pub fn skip_blocklet_data(&mut self, reset: bool) -> Result<(), ScanError> {
        let len = self.read_frame_len("blocklet data")? as u64;
        let skipped = std::io::copy(&mut (&mut self.input).take(len), &mut std::io::sink())?;
        self.pos += skipped;
        if skipped < len {
            return Err(ScanError::corruption("blocklet data truncated while skipping"));
        }
        if reset {
            self.row_nums = 0;
            self.row_index = 0;
        }
        self.payload_len = 0;
        self.offset = 0;
        self.payload_loaded = false;
        self.payload_pending = false;
        Ok(())
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.row_index < self.row_nums
    }

    #[inline]
    pub fn next_row(&mut self) {
        self.row_index += 1;
    }

    pub fn row_nums(&self) -> usize {
        self.row_nums
    }

    /// True when a payload is buffered and every byte of it was consumed.
    pub fn is_payload_exhausted(&self) -> bool {
        !self.payload_loaded || self.offset == self.payload_len
    }

    pub fn payload_loaded(&self) -> bool {
        self.payload_loaded
    }

    pub fn payload_offset(&self) -> usize {
        self.offset
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    /// Bytes consumed from the split start.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn limit(&self) -> u64 {
        self.limit_start
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&[u8], ScanError> {
        let start = self.offset;
        let end = start
            .checked_add(n)
            .filter(|end| *end <= self.payload_len)
            .ok_or_else(|| {
                ScanError::corruption(format!(
                    "row data truncated: need {} bytes at offset {} of {}",
                    n, start, self.payload_len
                ))
            })?;
        self.offset = end;
        Ok(&self.buffer[start..end])
    }

    #[inline]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ScanError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_short(&mut self) -> Result<i16, ScanError> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, ScanError> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    pub fn read_int(&mut self) -> Result<i32, ScanError> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_long(&mut self) -> Result<i64, ScanError> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn read_double(&mut self) -> Result<f64, ScanError> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    pub fn read_boolean(&mut self) -> Result<bool, ScanError> {
        Ok(self.take_array::<1>()?[0] != 0)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8], ScanError> {
        self.take(n)
    }

    /// Returns the next `n` bytes without advancing the cursor.
    pub fn copy(&self, n: usize) -> Result<&[u8], ScanError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.payload_len)
            .ok_or_else(|| {
                ScanError::corruption(format!(
                    "row data truncated: need {} bytes at offset {} of {}",
                    n, self.offset, self.payload_len
                ))
            })?;
        Ok(&self.buffer[self.offset..end])
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<(), ScanError> {
        self.take(n).map(|_| ())
    }

    fn read_frame_len(&mut self, what: &str) -> Result<usize, ScanError> {
        let mut raw = [0u8; 4];
        if self.read_fully(&mut raw)? < 4 {
            return Err(ScanError::corruption(format!("truncated {what} length")));
        }
        let len = i32::from_be_bytes(raw);
        usize::try_from(len)
            .map_err(|_| ScanError::corruption(format!("negative {what} length {len}")))
    }

    /// Reads until `buf` is full or the stream ends; returns the bytes read.
    fn read_fully(&mut self, buf: &mut [u8]) -> Result<usize, ScanError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.input.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ScanError::Io(e)),
            }
        }
        self.pos += filled as u64;
        Ok(filled)
    }
}
