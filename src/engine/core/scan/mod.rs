pub mod metrics;
pub mod output_mode;
pub mod pruner;
pub mod record_reader;

pub use metrics::ScanMetrics;
pub use output_mode::{OutputMode, ScanRequest};
pub use pruner::is_scan_required;
pub use record_reader::StreamRecordReader;
