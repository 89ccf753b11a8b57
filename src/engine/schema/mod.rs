pub mod errors;
pub mod segment_schema;
pub mod storage_column;

pub use errors::SchemaError;
pub use segment_schema::SegmentSchema;
pub use storage_column::{ColumnEncoding, ColumnRole, DataType, StorageColumn};
