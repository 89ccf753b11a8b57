//! Key codec for no-dictionary dimensions.
//!
//! Numeric keys are written big-endian with the sign bit flipped so that
//! unsigned byte order equals numeric order; min/max pruning compares keys as
//! plain byte strings.

use crate::engine::errors::ScanError;
use crate::engine::schema::DataType;
use crate::engine::types::{MEMBER_DEFAULT_VAL, Value};

const SHORT_SIGN: u16 = 1 << 15;
const INT_SIGN: u32 = 1 << 31;
const LONG_SIGN: u64 = 1 << 63;

/// Encodes `value` as a no-dictionary key for `data_type`. `Null` encodes to
/// the member-default sentinel. Returns `None` when the value does not fit
/// the type.
pub fn encode(value: &Value, data_type: &DataType) -> Option<Vec<u8>> {
    if value.is_null() {
        return Some(MEMBER_DEFAULT_VAL.to_vec());
    }
    let value = value.coerce_to(data_type)?;
    Some(match value {
        Value::String(s) => s.into_bytes(),
        Value::Bytes(b) => b,
        Value::Boolean(b) => vec![b as u8],
        Value::Short(v) => ((v as u16) ^ SHORT_SIGN).to_be_bytes().to_vec(),
        Value::Int(v) | Value::Date(v) => ((v as u32) ^ INT_SIGN).to_be_bytes().to_vec(),
        Value::Long(v) | Value::Timestamp(v) => ((v as u64) ^ LONG_SIGN).to_be_bytes().to_vec(),
        Value::Double(d) => ordered_f64_bits(d).to_be_bytes().to_vec(),
        _ => return None,
    })
}

/// Converts a stored key back into a typed value.
pub fn decode(bytes: &[u8], data_type: &DataType) -> Result<Value, ScanError> {
    if bytes == MEMBER_DEFAULT_VAL {
        return Ok(Value::Null);
    }
    match data_type {
        DataType::String => String::from_utf8(bytes.to_vec())
            .map(Value::String)
            .map_err(|e| ScanError::corruption(format!("invalid UTF-8 in string key: {e}"))),
        DataType::Binary => Ok(Value::Bytes(bytes.to_vec())),
        _ if bytes.is_empty() => Ok(Value::Null),
        DataType::Boolean => Ok(Value::Boolean(fixed::<1>(bytes, data_type)?[0] != 0)),
        DataType::Short => Ok(Value::Short(
            (u16::from_be_bytes(fixed::<2>(bytes, data_type)?) ^ SHORT_SIGN) as i16,
        )),
        DataType::Int => Ok(Value::Int(
            (u32::from_be_bytes(fixed::<4>(bytes, data_type)?) ^ INT_SIGN) as i32,
        )),
        DataType::Date => Ok(Value::Date(
            (u32::from_be_bytes(fixed::<4>(bytes, data_type)?) ^ INT_SIGN) as i32,
        )),
        DataType::Long => Ok(Value::Long(
            (u64::from_be_bytes(fixed::<8>(bytes, data_type)?) ^ LONG_SIGN) as i64,
        )),
        DataType::Timestamp => Ok(Value::Timestamp(
            (u64::from_be_bytes(fixed::<8>(bytes, data_type)?) ^ LONG_SIGN) as i64,
        )),
        DataType::Double => Ok(Value::Double(f64_from_ordered_bits(u64::from_be_bytes(
            fixed::<8>(bytes, data_type)?,
        )))),
        DataType::Decimal { .. } | DataType::Array | DataType::Struct => Err(
            ScanError::corruption(format!("{:?} cannot be a no-dictionary key", data_type)),
        ),
    }
}

fn fixed<const N: usize>(bytes: &[u8], data_type: &DataType) -> Result<[u8; N], ScanError> {
    bytes.try_into().map_err(|_| {
        ScanError::corruption(format!(
            "{:?} key must be {} bytes, found {}",
            data_type,
            N,
            bytes.len()
        ))
    })
}

fn ordered_f64_bits(d: f64) -> u64 {
    let bits = d.to_bits();
    if bits & LONG_SIGN != 0 { !bits } else { bits ^ LONG_SIGN }
}

fn f64_from_ordered_bits(bits: u64) -> f64 {
    if bits & LONG_SIGN != 0 {
        f64::from_bits(bits ^ LONG_SIGN)
    } else {
        f64::from_bits(!bits)
    }
}
