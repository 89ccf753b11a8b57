use std::cmp::Ordering;
use std::path::Path;

use crate::engine::core::column::MeasureCodec;
use crate::engine::core::dictionary::DirectDictionaryGenerator;
use crate::engine::core::stream::BlockletHeader;
use crate::engine::schema::{ColumnEncoding, SegmentSchema, StorageColumn};
use crate::engine::types::{MEMBER_DEFAULT_VAL, Value, no_dictionary};
use crate::shared::config::DirectDictionaryConfig;
use crate::shared::storage_header::StreamFileHeader;
use crate::test_helpers::factories::NestedBytesFactory;

pub const TEST_SYNC_MARKER: [u8; 16] = [
    0xA7, 0x3C, 0x91, 0xE2, 0x5B, 0x08, 0xF4, 0xC6, 0x1D, 0x7A, 0xB3, 0x6E, 0x92, 0x0F, 0xD8, 0x45,
];

/// Writes streaming segments in the on-disk layout the scan reads.
pub struct SegmentFileFactory {
    schema: SegmentSchema,
    marker: Vec<u8>,
    column_names: Option<Vec<String>>,
    blocklets: Vec<Vec<Vec<Value>>>,
    min_max: bool,
    direct: DirectDictionaryConfig,
}

/// Encoded segment plus the byte offset of every blocklet's marker.
pub struct SegmentBytes {
    pub bytes: Vec<u8>,
    pub header_len: u64,
    pub blocklet_offsets: Vec<u64>,
    pub marker: Vec<u8>,
}

impl SegmentBytes {
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, &self.bytes).expect("write segment file");
    }
}

impl SegmentFileFactory {
    pub fn new(schema: SegmentSchema) -> Self {
        Self {
            schema,
            marker: TEST_SYNC_MARKER.to_vec(),
            column_names: None,
            blocklets: Vec::new(),
            min_max: true,
            direct: DirectDictionaryConfig::default(),
        }
    }

    pub fn with_marker(mut self, marker: &[u8]) -> Self {
        self.marker = marker.to_vec();
        self
    }

    /// Overrides the column list recorded in the file header.
    pub fn with_header_columns(mut self, names: Vec<String>) -> Self {
        self.column_names = Some(names);
        self
    }

    pub fn with_min_max(mut self, enabled: bool) -> Self {
        self.min_max = enabled;
        self
    }

    pub fn with_blocklet(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.blocklets.push(rows);
        self
    }

    pub fn create(&self) -> SegmentBytes {
        let names = self
            .column_names
            .clone()
            .unwrap_or_else(|| self.schema.column_names());
        let mut bytes = Vec::new();
        StreamFileHeader::with_marker(self.marker.clone(), names)
            .write_to(&mut bytes)
            .expect("write file header");
        let header_len = bytes.len() as u64;

        let mut blocklet_offsets = Vec::with_capacity(self.blocklets.len());
        for rows in &self.blocklets {
            blocklet_offsets.push(bytes.len() as u64);
            bytes.extend_from_slice(&self.encode_blocklet(rows));
        }

        SegmentBytes {
            bytes,
            header_len,
            blocklet_offsets,
            marker: self.marker.clone(),
        }
    }

    /// `[marker][i32 header len][header][i32 payload len][payload]`
    pub fn encode_blocklet(&self, rows: &[Vec<Value>]) -> Vec<u8> {
        let payload: Vec<u8> = rows.iter().flat_map(|r| self.encode_row(r)).collect();
        let mut header = BlockletHeader::new(rows.len() as u32, payload.len() as u32);
        if self.min_max {
            let (min, max) = self.min_max_of(rows);
            header = header.with_min_max(min, max);
        }
        Self::frame(&self.marker, &header, &payload)
    }

    pub fn frame(marker: &[u8], header: &BlockletHeader, payload: &[u8]) -> Vec<u8> {
        let header = header.encode().expect("encode blocklet header");
        let mut out = Vec::with_capacity(marker.len() + 8 + header.len() + payload.len());
        out.extend_from_slice(marker);
        out.extend_from_slice(&(header.len() as i32).to_be_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&(payload.len() as i32).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    pub fn encode_row(&self, row: &[Value]) -> Vec<u8> {
        assert_eq!(row.len(), self.schema.len(), "row width must match schema");
        let mut out = Vec::new();
        if row.iter().any(Value::is_null) {
            let mut bitmap = vec![0u8; row.len().div_ceil(8)];
            for (i, v) in row.iter().enumerate() {
                if v.is_null() {
                    bitmap[i / 8] |= 1 << (i % 8);
                }
            }
            out.extend_from_slice(&(bitmap.len() as u16).to_be_bytes());
            out.extend_from_slice(&bitmap);
        } else {
            out.extend_from_slice(&0u16.to_be_bytes());
        }

        for (column, value) in self.schema.columns().iter().zip(row) {
            if !value.is_null() {
                out.extend_from_slice(&self.encode_cell(column, value));
            }
        }
        out
    }

    /// Encoded bytes of one non-null column value, length prefix included.
    pub fn encode_cell(&self, column: &StorageColumn, value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        match column.encoding {
            ColumnEncoding::NoDictionary => {
                let key = no_dictionary::encode(value, &column.data_type).expect("key");
                out.extend_from_slice(&(key.len() as u16).to_be_bytes());
                out.extend_from_slice(&key);
            }
            ColumnEncoding::DirectDictionary | ColumnEncoding::Dictionary => {
                out.extend_from_slice(&self.surrogate(column, value).to_be_bytes());
            }
            ColumnEncoding::Complex => {
                let nested = NestedBytesFactory::encode(column, value);
                out.extend_from_slice(&(nested.len() as u16).to_be_bytes());
                out.extend_from_slice(&nested);
            }
            ColumnEncoding::Plain => {
                let codec = MeasureCodec::for_type(&column.data_type).expect("measure");
                let bytes = codec.encode_bound(value).expect("measure value");
                if codec.fixed_width().is_none() {
                    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                }
                out.extend_from_slice(&bytes);
            }
        }
        out
    }

    fn surrogate(&self, column: &StorageColumn, value: &Value) -> i32 {
        match column.encoding {
            ColumnEncoding::DirectDictionary => {
                DirectDictionaryGenerator::for_type(&column.data_type, &self.direct)
                    .expect("generator")
                    .surrogate_for(value)
                    .expect("representable direct dictionary value")
            }
            _ => match value {
                Value::Int(s) => *s,
                other => panic!("dictionary cells are surrogates, got {other:?}"),
            },
        }
    }

    /// Bounds over non-null values. All-null dimensions get the
    /// member-default key; all-null measures and complex columns get no bytes.
    fn min_max_of(&self, rows: &[Vec<Value>]) -> (Vec<Vec<u8>>, Vec<Vec<u8>>) {
        let mut min = Vec::with_capacity(self.schema.len());
        let mut max = Vec::with_capacity(self.schema.len());
        for (idx, column) in self.schema.columns().iter().enumerate() {
            let present = rows.iter().map(|r| &r[idx]).filter(|v| !v.is_null());
            let (lo, hi) = match column.encoding {
                ColumnEncoding::Complex => (Vec::new(), Vec::new()),
                ColumnEncoding::Plain => {
                    let codec = MeasureCodec::for_type(&column.data_type).expect("measure");
                    let mut values: Vec<&Value> = present.collect();
                    values.sort_by(|a, b| a.compare(b).unwrap_or(Ordering::Equal));
                    match (values.first(), values.last()) {
                        (Some(lo), Some(hi)) => (
                            codec.encode_bound(lo).expect("bound"),
                            codec.encode_bound(hi).expect("bound"),
                        ),
                        _ => (Vec::new(), Vec::new()),
                    }
                }
                ColumnEncoding::NoDictionary => {
                    let mut keys: Vec<Vec<u8>> = present
                        .map(|v| no_dictionary::encode(v, &column.data_type).expect("key"))
                        .collect();
                    keys.sort();
                    Self::bounds_or_default(keys)
                }
                ColumnEncoding::DirectDictionary | ColumnEncoding::Dictionary => {
                    let mut keys: Vec<Vec<u8>> = present
                        .map(|v| self.surrogate(column, v).to_be_bytes().to_vec())
                        .collect();
                    keys.sort();
                    Self::bounds_or_default(keys)
                }
            };
            min.push(lo);
            max.push(hi);
        }
        (min, max)
    }

    fn bounds_or_default(sorted: Vec<Vec<u8>>) -> (Vec<u8>, Vec<u8>) {
        match (sorted.first(), sorted.last()) {
            (Some(lo), Some(hi)) => (lo.clone(), hi.clone()),
            _ => (MEMBER_DEFAULT_VAL.to_vec(), MEMBER_DEFAULT_VAL.to_vec()),
        }
    }
}
