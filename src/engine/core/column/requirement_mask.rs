use tracing::debug;

use crate::engine::errors::ScanError;
use crate::engine::schema::SegmentSchema;

/// Which storage columns a scan must decode, and where their values go.
///
/// Built once per scan. A column that is neither filter- nor
/// projection-required is skipped at the byte level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementMask {
    filter_slots: Vec<Option<usize>>,
    projection_slots: Vec<Vec<usize>>,
    filter_row_len: usize,
    output_len: usize,
}

impl RequirementMask {
    /// `filter_columns` are the names the predicate reads; `projection` lists
    /// output columns in output order and may repeat a column.
    pub fn build(
        schema: &SegmentSchema,
        filter_columns: &[String],
        projection: &[String],
    ) -> Result<Self, ScanError> {
        let mut mask = Self {
            filter_slots: vec![None; schema.len()],
            projection_slots: vec![Vec::new(); schema.len()],
            filter_row_len: schema.filter_row_len(),
            output_len: projection.len(),
        };
        mask.bind_filter_columns(schema, filter_columns)?;

        for (out, name) in projection.iter().enumerate() {
            let idx = schema.position(name).ok_or_else(|| {
                ScanError::InvalidProjection(format!("unknown column '{}'", name))
            })?;
            mask.projection_slots[idx].push(out);
        }

        debug!(
            target: "segment_stream::column",
            filter_columns = mask.filter_required_count(),
            projected = projection.len(),
            required = mask.required_count(),
            "Built requirement mask"
        );
        Ok(mask)
    }

    /// Every column decoded; output slot equals storage index.
    pub fn raw(schema: &SegmentSchema, filter_columns: &[String]) -> Result<Self, ScanError> {
        let mut mask = Self {
            filter_slots: vec![None; schema.len()],
            projection_slots: (0..schema.len()).map(|i| vec![i]).collect(),
            filter_row_len: schema.filter_row_len(),
            output_len: schema.len(),
        };
        mask.bind_filter_columns(schema, filter_columns)?;
        Ok(mask)
    }

    fn bind_filter_columns(
        &mut self,
        schema: &SegmentSchema,
        filter_columns: &[String],
    ) -> Result<(), ScanError> {
        for name in filter_columns {
            let idx = schema.position(name).ok_or_else(|| {
                ScanError::InvalidFilter(format!("filter references unknown column '{}'", name))
            })?;
            let slot = schema
                .filter_slot(idx)
                .filter(|slot| *slot < self.filter_row_len)
                .ok_or_else(|| {
                    ScanError::InvalidFilter(format!(
                        "column '{}' has no slot in a {}-slot filter row",
                        name, self.filter_row_len
                    ))
                })?;
            self.filter_slots[idx] = Some(slot);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.filter_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filter_slots.is_empty()
    }

    pub fn is_filter_required(&self, idx: usize) -> bool {
        self.filter_slot(idx).is_some()
    }

    pub fn is_projection_required(&self, idx: usize) -> bool {
        !self.projection_slots(idx).is_empty()
    }

    pub fn is_required(&self, idx: usize) -> bool {
        self.is_filter_required(idx) || self.is_projection_required(idx)
    }

    pub fn filter_slot(&self, idx: usize) -> Option<usize> {
        self.filter_slots.get(idx).copied().flatten()
    }

    pub fn projection_slots(&self, idx: usize) -> &[usize] {
        self.projection_slots
            .get(idx)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn filter_row_len(&self) -> usize {
        self.filter_row_len
    }

    pub fn output_len(&self) -> usize {
        self.output_len
    }

    pub fn filter_required_count(&self) -> usize {
        self.filter_slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn required_count(&self) -> usize {
        (0..self.len()).filter(|i| self.is_required(*i)).count()
    }

    /// True when no column needs decoding at all.
    pub fn nothing_required(&self) -> bool {
        self.required_count() == 0
    }
}
