use roaring::RoaringBitmap;

use crate::engine::core::filter::FilterRow;
use crate::engine::errors::FilterError;

/// Predicate pushed into a stream scan.
pub trait FilterExecutor: Send + Sync {
    /// Names of the storage columns the predicate reads. Each one must be
    /// decoded into the filter row before `apply_filter` is called.
    fn referenced_columns(&self) -> Vec<String>;

    /// Storage indices of columns whose `[min, max]` bounds could satisfy the
    /// predicate. An empty set proves no row of the blocklet matches.
    fn is_scan_required(&self, max_values: &[Vec<u8>], min_values: &[Vec<u8>]) -> RoaringBitmap;

    /// Tests one decoded row. Measure slots start at `dimension_ordinal_max`.
    fn apply_filter(&self, row: &FilterRow, dimension_ordinal_max: usize)
    -> Result<bool, FilterError>;
}
