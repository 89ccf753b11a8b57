use thiserror::Error;
use tracing::{debug, error};

use crate::engine::schema::SchemaError;

/// Errors that abort a stream scan. None of them are retried locally.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Stream corruption: {0}")]
    StreamCorruption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema mismatch: expected {expected} storage columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to filter row: {0}")]
    FilterEvaluation(#[from] FilterError),

    #[error("Batch sink failure: {0}")]
    BatchSink(#[from] SinkError),

    #[error("Complex value decode failed: {0}")]
    ComplexDecode(String),

    #[error("Header decode failed: {0}")]
    HeaderDecode(#[from] bincode::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scan already closed")]
    Closed,

    #[error("Scan aborted by an earlier error")]
    Aborted,
}

impl ScanError {
    pub fn corruption(msg: impl Into<String>) -> Self {
        ScanError::StreamCorruption(msg.into())
    }

    pub fn log_error(&self) {
        match self {
            ScanError::StreamCorruption(e) => {
                error!("Stream corruption: {}", e);
                debug!("Stream corruption details: {:?}", e);
            }
            ScanError::Io(e) => {
                error!("I/O error during scan: {}", e);
                debug!("I/O error details: {:?}", e);
            }
            ScanError::SchemaMismatch { expected, found } => {
                error!("Schema mismatch: expected {}, found {}", expected, found);
            }
            ScanError::Schema(e) => {
                error!("Schema error: {}", e);
                debug!("Schema error details: {:?}", e);
            }
            ScanError::InvalidProjection(e) => error!("Invalid projection: {}", e),
            ScanError::InvalidFilter(e) => error!("Invalid filter: {}", e),
            ScanError::FilterEvaluation(e) => {
                error!("Filter evaluation failed: {}", e);
                debug!("Filter evaluation error details: {:?}", e);
            }
            ScanError::BatchSink(e) => {
                error!("Batch sink failure: {}", e);
                debug!("Batch sink error details: {:?}", e);
            }
            ScanError::ComplexDecode(e) => error!("Complex value decode failed: {}", e),
            ScanError::HeaderDecode(e) => {
                error!("Header decode failed: {}", e);
                debug!("Header decode error details: {:?}", e);
            }
            ScanError::Config(e) => error!("Invalid configuration: {}", e),
            ScanError::Closed => error!("Scan used after close"),
            ScanError::Aborted => error!("Scan used after a fatal error"),
        }
    }
}

/// Raised by a filter executor while testing a row.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter slot {0} is outside the filter row")]
    MissingSlot(usize),

    #[error("filter slot {slot} holds {found}, expected {expected}")]
    UnexpectedValue {
        slot: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unsupported filter: {0}")]
    Unsupported(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SinkError {
    #[error("row index {row} out of bounds (capacity={capacity})")]
    RowOutOfBounds { row: usize, capacity: usize },

    #[error("column index {0} out of bounds")]
    ColumnOutOfBounds(usize),

    #[error("row count {count} exceeds capacity {capacity}")]
    RowCountExceedsCapacity { count: usize, capacity: usize },

    #[error("column {column} cannot hold a {value} value")]
    UnsupportedValue { column: usize, value: &'static str },

    #[error("sink has no output schema")]
    MissingSchema,

    #[error("sink is closed")]
    Closed,

    #[error("arrow error: {0}")]
    Arrow(String),
}
