use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use roaring::RoaringBitmap;

use crate::engine::core::filter::{FilterExecutor, FilterRow};
use crate::engine::errors::FilterError;

/// Wraps a filter and counts how often each hook runs.
pub struct CountingFilter {
    inner: Arc<dyn FilterExecutor>,
    prunes: AtomicUsize,
    evaluations: AtomicUsize,
}

impl CountingFilter {
    pub fn new(inner: Arc<dyn FilterExecutor>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            prunes: AtomicUsize::new(0),
            evaluations: AtomicUsize::new(0),
        })
    }

    pub fn prunes(&self) -> usize {
        self.prunes.load(Ordering::SeqCst)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl FilterExecutor for CountingFilter {
    fn referenced_columns(&self) -> Vec<String> {
        self.inner.referenced_columns()
    }

    fn is_scan_required(&self, max_values: &[Vec<u8>], min_values: &[Vec<u8>]) -> RoaringBitmap {
        self.prunes.fetch_add(1, Ordering::SeqCst);
        self.inner.is_scan_required(max_values, min_values)
    }

    fn apply_filter(
        &self,
        row: &FilterRow,
        dimension_ordinal_max: usize,
    ) -> Result<bool, FilterError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.inner.apply_filter(row, dimension_ordinal_max)
    }
}

/// Filter that fails on its first `failures` rows and accepts the rest.
pub struct FailingFilter {
    columns: Vec<String>,
    remaining: AtomicUsize,
}

impl FailingFilter {
    pub fn always(columns: Vec<String>) -> Self {
        Self::failing_first(columns, usize::MAX)
    }

    pub fn failing_first(columns: Vec<String>, failures: usize) -> Self {
        Self {
            columns,
            remaining: AtomicUsize::new(failures),
        }
    }
}

impl FilterExecutor for FailingFilter {
    fn referenced_columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn is_scan_required(&self, _max: &[Vec<u8>], _min: &[Vec<u8>]) -> RoaringBitmap {
        let mut all = RoaringBitmap::new();
        all.insert(0);
        all
    }

    fn apply_filter(&self, _row: &FilterRow, _dim_max: usize) -> Result<bool, FilterError> {
        let failed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(FilterError::Unsupported("filter failed".into()));
        }
        Ok(true)
    }
}
