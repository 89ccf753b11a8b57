pub mod counting_filter;
pub mod expression_factory;
pub mod nested_bytes_factory;
pub mod row_factory;
pub mod schema_factory;
pub mod segment_file_factory;

pub use counting_filter::{CountingFilter, FailingFilter};
pub use expression_factory::ExpressionFactory;
pub use nested_bytes_factory::NestedBytesFactory;
pub use row_factory::RowFactory;
pub use schema_factory::SchemaFactory;
pub use segment_file_factory::{SegmentBytes, SegmentFileFactory, TEST_SYNC_MARKER};

#[cfg(test)]
mod row_factory_test;
#[cfg(test)]
mod segment_file_factory_test;
