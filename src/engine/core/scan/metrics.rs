/// Counters of one scan. Owned by the scan, so plain integers suffice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanMetrics {
    pub blocklets_seen: u64,
    /// Ruled out by the min/max index
    pub blocklets_pruned: u64,
    /// Payload skipped because no column had to be decoded
    pub blocklets_skipped: u64,
    pub rows_decoded: u64,
    pub rows_filtered_out: u64,
    /// Rows handed to the caller: returned rows, or finalized batch rows
    pub records_read: u64,
}

impl ScanMetrics {
    pub fn on_blocklet(&mut self) {
        self.blocklets_seen += 1;
    }

    pub fn on_pruned(&mut self) {
        self.blocklets_pruned += 1;
    }

    pub fn on_skipped(&mut self) {
        self.blocklets_skipped += 1;
    }

    pub fn on_decoded(&mut self) {
        self.rows_decoded += 1;
    }

    pub fn on_filtered_out(&mut self) {
        self.rows_filtered_out += 1;
    }

    pub fn on_records(&mut self, count: usize) {
        self.records_read += count as u64;
    }

    /// Blocklets whose rows were visited one by one.
    pub fn blocklets_decoded(&self) -> u64 {
        self.blocklets_seen - self.blocklets_pruned - self.blocklets_skipped
    }
}
