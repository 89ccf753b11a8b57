use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Schema has no columns
    EmptySchema,

    /// Two storage columns share a name
    DuplicateColumn(String),

    /// Column breaks the dimension / complex / measure storage order
    OutOfOrder(String),

    /// Encoding and data type do not agree
    InvalidColumn(String),

    /// Ordinal outside its role's ordinal space, or repeated
    InvalidOrdinal(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::EmptySchema => write!(f, "Schema cannot be empty"),
            SchemaError::DuplicateColumn(name) => write!(f, "Duplicate column '{}'", name),
            SchemaError::OutOfOrder(name) => {
                write!(f, "Column '{}' is out of storage order", name)
            }
            SchemaError::InvalidColumn(e) => write!(f, "Invalid column: {}", e),
            SchemaError::InvalidOrdinal(e) => write!(f, "Invalid ordinal: {}", e),
        }
    }
}

impl std::error::Error for SchemaError {}
