use std::sync::Arc;

use crate::engine::core::filter::FilterExecutor;
use crate::engine::core::read::sink::{ColumnarBatchSink, NoopBatchSink};
use crate::engine::schema::SegmentSchema;

/// What a scan emits. One decode routine serves all three modes.
pub enum OutputMode<S: ColumnarBatchSink = NoopBatchSink> {
    /// One record per accepted row holding the projected columns
    Row,
    /// One storage-order tuple per accepted row in stored form
    Raw,
    /// One batch per blocklet with accepted rows, written into the sink
    Columnar(S),
}

impl<S: ColumnarBatchSink> OutputMode<S> {
    pub fn is_raw(&self) -> bool {
        matches!(self, OutputMode::Raw)
    }

    pub fn is_columnar(&self) -> bool {
        matches!(self, OutputMode::Columnar(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputMode::Row => "row",
            OutputMode::Raw => "raw",
            OutputMode::Columnar(_) => "columnar",
        }
    }
}

/// Projection and predicate of one scan.
#[derive(Clone, Default)]
pub struct ScanRequest {
    pub projection: Vec<String>,
    pub filter: Option<Arc<dyn FilterExecutor>>,
}

impl ScanRequest {
    pub fn new(projection: Vec<String>) -> Self {
        Self {
            projection,
            filter: None,
        }
    }

    /// Projects every storage column in storage order.
    pub fn all_columns(schema: &SegmentSchema) -> Self {
        Self::new(schema.column_names())
    }

    pub fn with_filter(mut self, filter: Arc<dyn FilterExecutor>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Columns the predicate reads; empty without one.
    pub fn filter_columns(&self) -> Vec<String> {
        self.filter
            .as_ref()
            .map(|f| f.referenced_columns())
            .unwrap_or_default()
    }
}
