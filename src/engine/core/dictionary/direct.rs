use crate::engine::errors::ScanError;
use crate::engine::schema::{DataType, SchemaError};
use crate::engine::types::Value;
use crate::shared::config::DirectDictionaryConfig;

/// Surrogate written for a null direct-dictionary value.
pub const MEMBER_DEFAULT_SURROGATE: i32 = 1;

const DATE_CUTOFF: i32 = i32::MAX >> 1;
const FIRST_TIMESTAMP_SURROGATE: i64 = 2;

/// Pure surrogate decoding for date and timestamp dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectDictionaryGenerator {
    /// Surrogate minus `i32::MAX >> 1` gives days since the epoch
    Date,
    /// Surrogate counts granularity steps from the cutoff
    Timestamp {
        granularity_millis: i64,
        cutoff_millis: i64,
    },
}

impl DirectDictionaryGenerator {
    pub fn for_type(
        data_type: &DataType,
        config: &DirectDictionaryConfig,
    ) -> Result<Self, ScanError> {
        match data_type {
            DataType::Date => Ok(Self::Date),
            DataType::Timestamp => {
                let cutoff_millis = config.cutoff_millis().map_err(|e| {
                    ScanError::Config(format!(
                        "bad timestamp cutoff '{}': {e}",
                        config.timestamp_cutoff
                    ))
                })?;
                Ok(Self::Timestamp {
                    granularity_millis: config.timestamp_granularity.millis(),
                    cutoff_millis,
                })
            }
            other => Err(ScanError::Schema(SchemaError::InvalidColumn(format!(
                "no direct dictionary for {:?}",
                other
            )))),
        }
    }

    /// Decoded value of a stored surrogate. A timestamp surrogate whose
    /// microseconds do not fit an i64 is corruption.
    pub fn value_of(&self, surrogate: i32) -> Result<Value, ScanError> {
        if surrogate == MEMBER_DEFAULT_SURROGATE {
            return Ok(Value::Null);
        }
        match *self {
            Self::Date => Ok(Value::Date(surrogate.wrapping_sub(DATE_CUTOFF))),
            Self::Timestamp {
                granularity_millis,
                cutoff_millis,
            } => (surrogate as i64 - FIRST_TIMESTAMP_SURROGATE)
                .checked_mul(granularity_millis)
                .and_then(|m| m.checked_add(cutoff_millis))
                .and_then(|m| m.checked_mul(1000))
                .map(Value::Timestamp)
                .ok_or_else(|| {
                    ScanError::corruption(format!(
                        "timestamp surrogate {surrogate} out of range"
                    ))
                }),
        }
    }

    /// Surrogate of `value`. `None` when the value is not representable,
    /// e.g. a timestamp finer than the granularity.
    pub fn surrogate_for(&self, value: &Value) -> Option<i32> {
        match (*self, value) {
            (_, Value::Null) => Some(MEMBER_DEFAULT_SURROGATE),
            (Self::Date, Value::Date(days)) => days.checked_add(DATE_CUTOFF),
            (
                Self::Timestamp {
                    granularity_millis,
                    cutoff_millis,
                },
                Value::Timestamp(micros),
            ) => {
                if micros % 1000 != 0 {
                    return None;
                }
                let since_cutoff = (micros / 1000).checked_sub(cutoff_millis)?;
                if since_cutoff < 0 || since_cutoff % granularity_millis != 0 {
                    return None;
                }
                i32::try_from(since_cutoff / granularity_millis + FIRST_TIMESTAMP_SURROGATE).ok()
            }
            _ => None,
        }
    }
}
