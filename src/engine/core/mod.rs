pub mod column;
pub mod dictionary;
pub mod filter;
pub mod read;
pub mod scan;
pub mod stream;

pub use column::{RequirementMask, RowDecoder};
pub use filter::{ExpressionFilter, FilterExecutor, FilterRow};
pub use read::sink::{ArrowBatchSink, ColumnBatchSink, ColumnarBatchSink, OutputSchema};
pub use scan::{OutputMode, ScanMetrics, ScanRequest, StreamRecordReader};
pub use stream::{BlockletHeader, BlockletReader, SegmentSource, StreamSplit};
