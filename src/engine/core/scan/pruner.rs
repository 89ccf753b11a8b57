use tracing::trace;

use crate::engine::core::filter::FilterExecutor;
use crate::engine::core::stream::BlockletHeader;

/// Decides whether a blocklet may hold a matching row.
///
/// Without a predicate or without a min/max index the blocklet is always
/// scanned. Otherwise it is skipped only when the predicate reports no
/// candidate column for the blocklet's bounds.
pub fn is_scan_required(filter: Option<&dyn FilterExecutor>, header: &BlockletHeader) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let Some(index) = header.min_max_index.as_ref() else {
        return true;
    };

    let candidates = filter.is_scan_required(&index.max_values, &index.min_values);
    if tracing::enabled!(tracing::Level::TRACE) {
        trace!(
            target: "segment_stream::scan",
            rows = header.row_count,
            candidates = candidates.len(),
            "Pruning blocklet"
        );
    }
    !candidates.is_empty()
}
