use tracing::debug;

use crate::engine::core::read::sink::{ColumnarBatchSink, OutputSchema};
use crate::engine::errors::SinkError;
use crate::engine::types::Value;

/// In-memory columnar batch: one `Vec<Value>` per output column.
///
/// Holds the most recent blocklet only; `set_capacity` starts a new batch.
#[derive(Debug, Default)]
pub struct ColumnBatchSink {
    schema: Option<OutputSchema>,
    columns: Vec<Vec<Value>>,
    capacity: usize,
    len: usize,
    batches: usize,
    closed: bool,
}

impl ColumnBatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Option<&OutputSchema> {
        self.schema.as_ref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of batches finalized so far.
    pub fn batch_count(&self) -> usize {
        self.batches
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&[Value]> {
        self.columns.get(idx).map(|c| &c[..self.len.min(c.len())])
    }

    pub fn row(&self, idx: usize) -> Option<Vec<Value>> {
        if idx >= self.len {
            return None;
        }
        Some(self.columns.iter().map(|c| c[idx].clone()).collect())
    }

    pub fn rows(&self) -> Vec<Vec<Value>> {
        (0..self.len).filter_map(|i| self.row(i)).collect()
    }

    /// Moves the finalized columns out, leaving the sink empty.
    pub fn take_columns(&mut self) -> Vec<Vec<Value>> {
        let width = self.columns.len();
        let mut columns = std::mem::replace(&mut self.columns, vec![Vec::new(); width]);
        for column in &mut columns {
            column.truncate(self.len);
        }
        self.capacity = 0;
        self.len = 0;
        columns
    }

    fn ensure_open(&self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        Ok(())
    }
}

impl ColumnarBatchSink for ColumnBatchSink {
    fn on_schema(&mut self, schema: &OutputSchema) -> Result<(), SinkError> {
        self.ensure_open()?;
        self.columns = vec![Vec::new(); schema.len()];
        self.schema = Some(schema.clone());
        Ok(())
    }

    fn set_capacity(&mut self, capacity: usize) -> Result<(), SinkError> {
        self.ensure_open()?;
        if self.schema.is_none() {
            return Err(SinkError::MissingSchema);
        }
        for column in &mut self.columns {
            column.clear();
            column.resize(capacity, Value::Null);
        }
        self.capacity = capacity;
        self.len = 0;
        Ok(())
    }

    fn put_value(&mut self, row: usize, value: Value, column: usize) -> Result<(), SinkError> {
        self.ensure_open()?;
        if row >= self.capacity {
            return Err(SinkError::RowOutOfBounds {
                row,
                capacity: self.capacity,
            });
        }
        let slot = self
            .columns
            .get_mut(column)
            .ok_or(SinkError::ColumnOutOfBounds(column))?;
        slot[row] = value;
        Ok(())
    }

    fn finalize_row_count(&mut self, count: usize) -> Result<(), SinkError> {
        self.ensure_open()?;
        if count > self.capacity {
            return Err(SinkError::RowCountExceedsCapacity {
                count,
                capacity: self.capacity,
            });
        }
        self.len = count;
        self.batches += 1;
        debug!(
            target: "segment_stream::sink",
            rows = count,
            capacity = self.capacity,
            "Finalized column batch"
        );
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }
}
