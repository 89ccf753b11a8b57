use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::engine::schema::DataType;
use crate::engine::types::Decimal;

/// Sentinel written into filter slots of null primitive dimensions.
pub const MEMBER_DEFAULT_VAL: &[u8] = b"@NU#LL$!";

/// A decoded cell. Filter slots and output slots both hold values of this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Bytes(Vec<u8>),
    /// Days since the Unix epoch
    Date(i32),
    /// Microseconds since the Unix epoch
    Timestamp(i64),
    Array(Vec<Value>),
    Struct(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// True for `Null` and for the member-default sentinel.
    pub fn is_null_or_default(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bytes(b) => b.as_slice() == MEMBER_DEFAULT_VAL,
            _ => false,
        }
    }

    /// Overwrites the slot with `src`, reusing the existing byte buffer when
    /// the slot already holds bytes.
    #[inline]
    pub fn set_bytes(&mut self, src: &[u8]) {
        match self {
            Value::Bytes(buf) => {
                buf.clear();
                buf.extend_from_slice(src);
            }
            other => *other = Value::Bytes(src.to_vec()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    /// Orders two values of the same kind. Mixed kinds and nulls are
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Short(a), Value::Short(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.compare(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Converts a literal into the representation used for `data_type`.
    /// Widening is always allowed; narrowing only when the value fits.
    pub fn coerce_to(&self, data_type: &DataType) -> Option<Value> {
        match (self, data_type) {
            (Value::Null, _) => Some(Value::Null),
            (Value::Boolean(b), DataType::Boolean) => Some(Value::Boolean(*b)),
            (v, DataType::Short) => v.as_i64().and_then(|n| i16::try_from(n).ok()).map(Value::Short),
            (v, DataType::Int) => v.as_i64().and_then(|n| i32::try_from(n).ok()).map(Value::Int),
            (v, DataType::Long) => v.as_i64().map(Value::Long),
            (Value::Double(d), DataType::Double) => Some(Value::Double(*d)),
            (v, DataType::Double) => v.as_i64().map(|n| Value::Double(n as f64)),
            (Value::Decimal(d), DataType::Decimal { precision, scale }) => {
                let aligned = if d.scale <= *scale { d.rescaled(*scale)? } else { *d };
                Some(Value::Decimal(Decimal::new(aligned.unscaled, *precision, aligned.scale)))
            }
            (v, DataType::Decimal { precision, scale }) => {
                let n = v.as_i64()?;
                Decimal::new(n as i128, *precision, 0)
                    .rescaled(*scale)
                    .map(Value::Decimal)
            }
            (Value::String(s), DataType::String) => Some(Value::String(s.clone())),
            (Value::Bytes(b), DataType::Binary) => Some(Value::Bytes(b.clone())),
            (Value::String(s), DataType::Binary) => Some(Value::Bytes(s.as_bytes().to_vec())),
            (Value::Date(d), DataType::Date) => Some(Value::Date(*d)),
            (Value::Timestamp(t), DataType::Timestamp) => Some(Value::Timestamp(*t)),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}
