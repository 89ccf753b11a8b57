use std::collections::HashSet;

use crate::engine::schema::{ColumnEncoding, ColumnRole, DataType, SchemaError, StorageColumn};

/// Storage-order column list of a streaming segment.
///
/// Columns must appear as primitive dimensions, then complex dimensions,
/// then measures. The row decoder walks them in exactly this order.
#[derive(Debug, Clone)]
pub struct SegmentSchema {
    columns: Vec<StorageColumn>,
    primitive_dimension_count: usize,
    dimension_count: usize,
    measure_count: usize,
    dimension_ordinal_max: usize,
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
enum Phase {
    Primitive,
    Complex,
    Measure,
}

impl SegmentSchema {
    pub fn new(columns: Vec<StorageColumn>) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut names = HashSet::with_capacity(columns.len());
        let mut phase = Phase::Primitive;
        let mut primitive_dimension_count = 0;
        let mut dimension_count = 0;
        let mut measure_count = 0;
        let mut dimension_ordinals = HashSet::new();
        let mut measure_ordinals = HashSet::new();
        let mut dimension_ordinal_max = 0;

        for column in &columns {
            if !names.insert(column.name.to_ascii_lowercase()) {
                return Err(SchemaError::DuplicateColumn(column.name.clone()));
            }

            let column_phase = match (column.role, column.encoding) {
                (ColumnRole::Measure, _) => Phase::Measure,
                (ColumnRole::Dimension, ColumnEncoding::Complex) => Phase::Complex,
                (ColumnRole::Dimension, _) => Phase::Primitive,
            };
            if column_phase < phase {
                return Err(SchemaError::OutOfOrder(column.name.clone()));
            }
            phase = column_phase;

            validate_column(column, false)?;

            match column_phase {
                Phase::Primitive | Phase::Complex => {
                    if !dimension_ordinals.insert(column.ordinal) {
                        return Err(SchemaError::InvalidOrdinal(format!(
                            "dimension ordinal {} repeated at '{}'",
                            column.ordinal, column.name
                        )));
                    }
                    dimension_count += 1;
                    if column_phase == Phase::Primitive {
                        primitive_dimension_count += 1;
                    }
                    dimension_ordinal_max = dimension_ordinal_max.max(column.ordinal + 1);
                }
                Phase::Measure => {
                    if !measure_ordinals.insert(column.ordinal) {
                        return Err(SchemaError::InvalidOrdinal(format!(
                            "measure ordinal {} repeated at '{}'",
                            column.ordinal, column.name
                        )));
                    }
                    measure_count += 1;
                }
            }
        }

        if let Some(bad) = columns
            .iter()
            .find(|c| c.role == ColumnRole::Measure && c.ordinal >= measure_count)
        {
            return Err(SchemaError::InvalidOrdinal(format!(
                "measure '{}' has ordinal {} but only {} measures exist",
                bad.name, bad.ordinal, measure_count
            )));
        }

        Ok(Self {
            columns,
            primitive_dimension_count,
            dimension_count,
            measure_count,
            dimension_ordinal_max,
        })
    }

    /// Widens the dimension ordinal space, e.g. when complex children own
    /// ordinals of their own in the table schema.
    pub fn with_dimension_ordinal_max(mut self, max: usize) -> Result<Self, SchemaError> {
        if max < self.dimension_ordinal_max {
            return Err(SchemaError::InvalidOrdinal(format!(
                "dimension ordinal max {} is below the highest ordinal in use ({})",
                max, self.dimension_ordinal_max
            )));
        }
        self.dimension_ordinal_max = max;
        Ok(self)
    }

    pub fn columns(&self) -> &[StorageColumn] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&StorageColumn> {
        self.columns.get(idx)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Storage index of `name`, matched case-insensitively.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn primitive_dimension_count(&self) -> usize {
        self.primitive_dimension_count
    }

    pub fn dimension_count(&self) -> usize {
        self.dimension_count
    }

    pub fn measure_count(&self) -> usize {
        self.measure_count
    }

    pub fn dimension_ordinal_max(&self) -> usize {
        self.dimension_ordinal_max
    }

    /// Number of slots in a filter row: dimension ordinal space followed by
    /// one slot per measure.
    pub fn filter_row_len(&self) -> usize {
        self.dimension_ordinal_max + self.measure_count
    }

    /// Filter-row slot for the column at storage index `idx`.
    pub fn filter_slot(&self, idx: usize) -> Option<usize> {
        let column = self.columns.get(idx)?;
        Some(match column.role {
            ColumnRole::Dimension => column.ordinal,
            ColumnRole::Measure => self.dimension_ordinal_max + column.ordinal,
        })
    }
}

fn validate_column(column: &StorageColumn, nested: bool) -> Result<(), SchemaError> {
    let invalid = |why: &str| {
        Err(SchemaError::InvalidColumn(format!(
            "'{}' ({:?}, {:?}): {}",
            column.name, column.encoding, column.data_type, why
        )))
    };

    match (column.role, column.encoding) {
        (ColumnRole::Measure, ColumnEncoding::Plain) => {
            if nested {
                return invalid("measures cannot be nested");
            }
            if !column.data_type.is_measure_type() {
                return invalid("measure must be boolean, short, int, long, double or decimal");
            }
        }
        (ColumnRole::Measure, _) => return invalid("measures use plain encoding"),
        (ColumnRole::Dimension, ColumnEncoding::Plain) => {
            return invalid("dimensions cannot use plain encoding");
        }
        (ColumnRole::Dimension, ColumnEncoding::NoDictionary) => {
            if column.data_type.is_complex()
                || matches!(column.data_type, DataType::Decimal { .. })
            {
                return invalid("no-dictionary dimensions hold primitive non-decimal types");
            }
        }
        (ColumnRole::Dimension, ColumnEncoding::DirectDictionary) => {
            if !matches!(column.data_type, DataType::Date | DataType::Timestamp) {
                return invalid("direct dictionary supports date and timestamp only");
            }
        }
        (ColumnRole::Dimension, ColumnEncoding::Dictionary) => {
            if column.data_type.is_complex() {
                return invalid("dictionary dimensions hold primitive types");
            }
        }
        (ColumnRole::Dimension, ColumnEncoding::Complex) => {
            match column.data_type {
                DataType::Array if column.children.len() == 1 => {}
                DataType::Array => return invalid("array needs exactly one child"),
                DataType::Struct if !column.children.is_empty() => {}
                DataType::Struct => return invalid("struct needs at least one child"),
                _ => return invalid("complex columns must be array or struct"),
            }
            for child in &column.children {
                validate_column(child, true)?;
            }
        }
    }

    if !column.is_complex() && !column.children.is_empty() {
        return invalid("only complex columns have children");
    }
    Ok(())
}
