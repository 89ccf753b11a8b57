use std::io::Read;
use std::sync::Arc;

use crate::engine::core::dictionary::{
    ComplexDecoderProvider, ComplexTypeDecoder, DictionaryCache, DirectDictionaryGenerator,
    NestedTypeDecoder,
};
use crate::engine::core::stream::BlockletReader;
use crate::engine::errors::ScanError;
use crate::engine::schema::{ColumnEncoding, DataType, SchemaError, StorageColumn};
use crate::engine::types::{Decimal, Value};
use crate::shared::config::DirectDictionaryConfig;

/// Collaborators needed to turn column bytes into values.
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    pub direct: &'a DirectDictionaryConfig,
    pub dictionary: Option<&'a dyn DictionaryCache>,
    pub complex: Option<&'a dyn ComplexDecoderProvider>,
}

impl<'a> CodecContext<'a> {
    pub fn new(direct: &'a DirectDictionaryConfig) -> Self {
        Self {
            direct,
            dictionary: None,
            complex: None,
        }
    }
}

/// How one storage column is laid out in a row, and how to read or skip it.
pub enum ColumnCodec {
    /// `[u16 len][key bytes]`
    NoDictionary(DataType),
    /// `[i32 surrogate]` decoded by a pure function
    DirectDictionary(DirectDictionaryGenerator),
    /// `[i32 surrogate]` forwarded as is
    Dictionary,
    /// `[u16 len][nested bytes]`; the decoder is only built for required columns
    Complex(Option<Arc<dyn ComplexTypeDecoder>>),
    Measure(MeasureCodec),
}

impl ColumnCodec {
    pub fn for_column(
        column: &StorageColumn,
        required: bool,
        ctx: CodecContext<'_>,
    ) -> Result<Self, ScanError> {
        Ok(match column.encoding {
            ColumnEncoding::NoDictionary => ColumnCodec::NoDictionary(column.data_type.clone()),
            ColumnEncoding::DirectDictionary => ColumnCodec::DirectDictionary(
                DirectDictionaryGenerator::for_type(&column.data_type, ctx.direct)?,
            ),
            ColumnEncoding::Dictionary => ColumnCodec::Dictionary,
            ColumnEncoding::Complex if !required => ColumnCodec::Complex(None),
            ColumnEncoding::Complex => {
                let decoder = match ctx.complex.and_then(|p| p.decoder_for(column)) {
                    Some(decoder) => decoder,
                    None => Arc::new(NestedTypeDecoder::new(column, ctx.dictionary, ctx.direct)?),
                };
                ColumnCodec::Complex(Some(decoder))
            }
            ColumnEncoding::Plain => ColumnCodec::Measure(
                MeasureCodec::for_type(&column.data_type).ok_or_else(|| {
                    SchemaError::InvalidColumn(format!(
                        "'{}' has no measure layout for {:?}",
                        column.name, column.data_type
                    ))
                })?,
            ),
        })
    }

    /// Advances past one non-null value, consuming exactly the bytes a read
    /// would.
    pub fn skip<R: Read>(&self, reader: &mut BlockletReader<R>) -> Result<(), ScanError> {
        match self {
            ColumnCodec::NoDictionary(_) | ColumnCodec::Complex(_) => {
                let len = reader.read_u16()? as usize;
                reader.skip_bytes(len)
            }
            ColumnCodec::DirectDictionary(_) | ColumnCodec::Dictionary => reader.skip_bytes(4),
            ColumnCodec::Measure(m) => m.skip(reader),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureCodec {
    Boolean,
    Short,
    Int,
    Long,
    Double,
    /// `[u16 len][unscaled big-endian bytes]`
    Decimal { precision: u8, scale: i8 },
}

impl MeasureCodec {
    pub fn for_type(data_type: &DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Boolean => MeasureCodec::Boolean,
            DataType::Short => MeasureCodec::Short,
            DataType::Int => MeasureCodec::Int,
            DataType::Long => MeasureCodec::Long,
            DataType::Double => MeasureCodec::Double,
            DataType::Decimal { precision, scale } => MeasureCodec::Decimal {
                precision: *precision,
                scale: *scale,
            },
            _ => return None,
        })
    }

    /// Width of the fixed-size kinds.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            MeasureCodec::Boolean => Some(1),
            MeasureCodec::Short => Some(2),
            MeasureCodec::Int => Some(4),
            MeasureCodec::Long | MeasureCodec::Double => Some(8),
            MeasureCodec::Decimal { .. } => None,
        }
    }

    pub fn read<R: Read>(&self, reader: &mut BlockletReader<R>) -> Result<Value, ScanError> {
        Ok(match *self {
            MeasureCodec::Boolean => Value::Boolean(reader.read_boolean()?),
            MeasureCodec::Short => Value::Short(reader.read_short()?),
            MeasureCodec::Int => Value::Int(reader.read_int()?),
            MeasureCodec::Long => Value::Long(reader.read_long()?),
            MeasureCodec::Double => Value::Double(reader.read_double()?),
            MeasureCodec::Decimal { precision, scale } => {
                let len = reader.read_u16()? as usize;
                let bytes = reader.read_bytes(len)?;
                Value::Decimal(Decimal::from_be_bytes(bytes, precision, scale).ok_or_else(
                    || ScanError::corruption(format!("invalid {len}-byte decimal value")),
                )?)
            }
        })
    }

    pub fn skip<R: Read>(&self, reader: &mut BlockletReader<R>) -> Result<(), ScanError> {
        match self.fixed_width() {
            Some(width) => reader.skip_bytes(width),
            None => {
                let len = reader.read_u16()? as usize;
                reader.skip_bytes(len)
            }
        }
    }

    /// Parses a min/max bound. Bounds use the value bytes without the length
    /// prefix. `None` when the bytes do not form a value of this kind.
    pub fn decode_bound(&self, bytes: &[u8]) -> Option<Value> {
        Some(match *self {
            MeasureCodec::Boolean => match bytes {
                [b] => Value::Boolean(*b != 0),
                _ => return None,
            },
            MeasureCodec::Short => Value::Short(i16::from_be_bytes(bytes.try_into().ok()?)),
            MeasureCodec::Int => Value::Int(i32::from_be_bytes(bytes.try_into().ok()?)),
            MeasureCodec::Long => Value::Long(i64::from_be_bytes(bytes.try_into().ok()?)),
            MeasureCodec::Double => Value::Double(f64::from_be_bytes(bytes.try_into().ok()?)),
            MeasureCodec::Decimal { precision, scale } => {
                Value::Decimal(Decimal::from_be_bytes(bytes, precision, scale)?)
            }
        })
    }

    /// Inverse of [`decode_bound`](Self::decode_bound).
    pub fn encode_bound(&self, value: &Value) -> Option<Vec<u8>> {
        Some(match (*self, value) {
            (MeasureCodec::Boolean, Value::Boolean(b)) => vec![*b as u8],
            (MeasureCodec::Short, Value::Short(v)) => v.to_be_bytes().to_vec(),
            (MeasureCodec::Int, Value::Int(v)) => v.to_be_bytes().to_vec(),
            (MeasureCodec::Long, Value::Long(v)) => v.to_be_bytes().to_vec(),
            (MeasureCodec::Double, Value::Double(v)) => v.to_be_bytes().to_vec(),
            (MeasureCodec::Decimal { .. }, Value::Decimal(d)) => d.to_be_bytes(),
            _ => return None,
        })
    }
}
