use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Short,
    Int,
    Long,
    Double,
    Decimal { precision: u8, scale: i8 },
    String,
    Binary,
    Date,
    Timestamp,
    Array,
    Struct,
}

impl DataType {
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Array | DataType::Struct)
    }

    /// Types a measure column may carry.
    pub fn is_measure_type(&self) -> bool {
        matches!(
            self,
            DataType::Boolean
                | DataType::Short
                | DataType::Int
                | DataType::Long
                | DataType::Double
                | DataType::Decimal { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnEncoding {
    /// Measures: fixed-width or length-prefixed numeric values
    Plain,
    /// Raw typed bytes
    NoDictionary,
    /// Surrogate decoded by a pure function (date / timestamp)
    DirectDictionary,
    /// Surrogate resolved through an external dictionary
    Dictionary,
    /// Nested array / struct
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Dimension,
    Measure,
}

/// One column of a streaming segment, in storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageColumn {
    pub name: String,
    /// Dimension ordinal for dimensions, measure ordinal for measures
    pub ordinal: usize,
    pub data_type: DataType,
    pub role: ColumnRole,
    pub encoding: ColumnEncoding,
    /// Key used for dictionary lookups; defaults to the column name
    pub column_id: String,
    #[serde(default)]
    pub children: Vec<StorageColumn>,
}

impl StorageColumn {
    fn dimension(name: &str, ordinal: usize, data_type: DataType, encoding: ColumnEncoding) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
            data_type,
            role: ColumnRole::Dimension,
            encoding,
            column_id: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn no_dictionary(name: &str, ordinal: usize, data_type: DataType) -> Self {
        Self::dimension(name, ordinal, data_type, ColumnEncoding::NoDictionary)
    }

    pub fn direct_dictionary(name: &str, ordinal: usize, data_type: DataType) -> Self {
        Self::dimension(name, ordinal, data_type, ColumnEncoding::DirectDictionary)
    }

    pub fn dictionary(name: &str, ordinal: usize, data_type: DataType) -> Self {
        Self::dimension(name, ordinal, data_type, ColumnEncoding::Dictionary)
    }

    pub fn complex(
        name: &str,
        ordinal: usize,
        data_type: DataType,
        children: Vec<StorageColumn>,
    ) -> Self {
        let mut column = Self::dimension(name, ordinal, data_type, ColumnEncoding::Complex);
        column.children = children;
        column
    }

    pub fn measure(name: &str, ordinal: usize, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            ordinal,
            data_type,
            role: ColumnRole::Measure,
            encoding: ColumnEncoding::Plain,
            column_id: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_column_id(mut self, column_id: &str) -> Self {
        self.column_id = column_id.to_string();
        self
    }

    pub fn is_dimension(&self) -> bool {
        self.role == ColumnRole::Dimension
    }

    pub fn is_complex(&self) -> bool {
        self.encoding == ColumnEncoding::Complex
    }

    /// Non-complex dimension (no-dictionary, direct-dictionary or dictionary).
    pub fn is_primitive_dimension(&self) -> bool {
        self.is_dimension() && !self.is_complex()
    }
}
