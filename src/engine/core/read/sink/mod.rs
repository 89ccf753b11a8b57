pub mod arrow_batch_sink;
pub mod batch_sink;
pub mod column_batch_sink;
pub mod output_schema;

pub use arrow_batch_sink::ArrowBatchSink;
pub use batch_sink::{ColumnarBatchSink, NoopBatchSink};
pub use column_batch_sink::ColumnBatchSink;
pub use output_schema::{OutputField, OutputSchema};
