use crate::engine::core::read::sink::OutputSchema;
use crate::engine::errors::SinkError;
use crate::engine::types::Value;

/// Receives the values of a columnar scan, one blocklet at a time.
///
/// For every surviving blocklet the scan calls `set_capacity` with the
/// blocklet's pre-filter row count, writes accepted rows at dense indices
/// `0..n` and then calls `finalize_row_count(n)`. Any error aborts the scan.
pub trait ColumnarBatchSink {
    /// Called once before the first blocklet.
    fn on_schema(&mut self, _schema: &OutputSchema) -> Result<(), SinkError> {
        Ok(())
    }

    fn set_capacity(&mut self, capacity: usize) -> Result<(), SinkError>;

    fn put_value(&mut self, row: usize, value: Value, column: usize) -> Result<(), SinkError>;

    fn finalize_row_count(&mut self, count: usize) -> Result<(), SinkError>;

    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Lets a caller lend a sink to a scan and keep it afterwards.
impl<S: ColumnarBatchSink + ?Sized> ColumnarBatchSink for &mut S {
    fn on_schema(&mut self, schema: &OutputSchema) -> Result<(), SinkError> {
        (**self).on_schema(schema)
    }

    fn set_capacity(&mut self, capacity: usize) -> Result<(), SinkError> {
        (**self).set_capacity(capacity)
    }

    fn put_value(&mut self, row: usize, value: Value, column: usize) -> Result<(), SinkError> {
        (**self).put_value(row, value, column)
    }

    fn finalize_row_count(&mut self, count: usize) -> Result<(), SinkError> {
        (**self).finalize_row_count(count)
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

/// Placeholder sink for row and raw scans.
#[derive(Debug, Default)]
pub struct NoopBatchSink;

impl ColumnarBatchSink for NoopBatchSink {
    fn set_capacity(&mut self, _capacity: usize) -> Result<(), SinkError> {
        Ok(())
    }

    fn put_value(&mut self, _row: usize, _value: Value, _column: usize) -> Result<(), SinkError> {
        Ok(())
    }

    fn finalize_row_count(&mut self, _count: usize) -> Result<(), SinkError> {
        Ok(())
    }
}
