use crate::engine::errors::ScanError;
use crate::engine::schema::{ColumnEncoding, DataType, SegmentSchema, StorageColumn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    pub name: String,
    pub data_type: DataType,
}

/// Names and types of the values a scan emits, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    fields: Vec<OutputField>,
}

impl OutputSchema {
    /// Typed output of the projected columns. Dictionary columns stay
    /// surrogates, so they are reported as `Int`.
    pub fn projected(schema: &SegmentSchema, projection: &[String]) -> Result<Self, ScanError> {
        let fields = projection
            .iter()
            .map(|name| {
                let column = schema
                    .position(name)
                    .and_then(|idx| schema.column(idx))
                    .ok_or_else(|| {
                        ScanError::InvalidProjection(format!("unknown column '{}'", name))
                    })?;
                Ok(OutputField {
                    name: column.name.clone(),
                    data_type: typed_output(column),
                })
            })
            .collect::<Result<Vec<_>, ScanError>>()?;
        Ok(Self { fields })
    }

    /// Storage-order tuple of a raw scan: keys and nested values as bytes,
    /// every surrogate as `Int`, measures as themselves.
    pub fn raw(schema: &SegmentSchema) -> Self {
        let fields = schema
            .columns()
            .iter()
            .map(|column| OutputField {
                name: column.name.clone(),
                data_type: raw_output(column),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    pub fn field(&self, idx: usize) -> Option<&OutputField> {
        self.fields.get(idx)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn typed_output(column: &StorageColumn) -> DataType {
    match column.encoding {
        ColumnEncoding::Dictionary => DataType::Int,
        _ => column.data_type.clone(),
    }
}

fn raw_output(column: &StorageColumn) -> DataType {
    match column.encoding {
        ColumnEncoding::NoDictionary | ColumnEncoding::Complex => DataType::Binary,
        ColumnEncoding::DirectDictionary | ColumnEncoding::Dictionary => DataType::Int,
        ColumnEncoding::Plain => column.data_type.clone(),
    }
}
