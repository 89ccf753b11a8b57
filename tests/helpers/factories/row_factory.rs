use crate::engine::schema::SegmentSchema;
use crate::engine::types::{Decimal, Value};

/// Builds storage-order rows in decoded (typed) form.
pub struct RowFactory {
    values: Vec<(String, Value)>,
}

impl RowFactory {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn with(mut self, column: &str, value: Value) -> Self {
        self.values.retain(|(c, _)| c != column);
        self.values.push((column.to_string(), value));
        self
    }

    pub fn with_null(self, column: &str) -> Self {
        self.with(column, Value::Null)
    }

    /// Columns not set explicitly are `Null`.
    pub fn create(self, schema: &SegmentSchema) -> Vec<Value> {
        let mut row = vec![Value::Null; schema.len()];
        for (column, value) in self.values {
            let idx = schema
                .position(&column)
                .unwrap_or_else(|| panic!("unknown column {column}"));
            row[idx] = value;
        }
        row
    }

    /// Row `i` of a deterministic sequence over `SchemaFactory::mixed()`,
    /// with nulls sprinkled over every column kind.
    pub fn mixed(i: usize) -> Vec<Value> {
        let n = i as i64;
        let null_if = |cond: bool, v: Value| if cond { Value::Null } else { v };
        vec![
            Value::String(format!("id-{i:03}")),
            null_if(i % 5 == 3, Value::Int(n as i32 * 3 - 20)),
            null_if(i % 7 == 2, Value::Date(19_000 + n as i32)),
            Value::Timestamp((1_600_000_000 + n * 60) * 1_000_000),
            null_if(i % 4 == 1, Value::Int(2 + (n as i32 % 3))),
            null_if(
                i % 6 == 5,
                Value::Array(
                    (0..i % 3)
                        .map(|k| Value::String(format!("t{}", i + k)))
                        .collect(),
                ),
            ),
            Value::Boolean(i % 2 == 0),
            Value::Short(n as i16 - 5),
            null_if(i % 8 == 7, Value::Int(n as i32 * 10)),
            Value::Long(n * 1_000 - 3),
            Value::Double(n as f64 * 1.5),
            null_if(i % 9 == 4, Value::Decimal(Decimal::new(n as i128 * 125 - 300, 10, 2))),
        ]
    }

    pub fn mixed_rows(range: std::ops::Range<usize>) -> Vec<Vec<Value>> {
        range.map(Self::mixed).collect()
    }

    /// Row over `SchemaFactory::simple()`.
    pub fn simple(name: &str, score: i32, amount: i64) -> Vec<Value> {
        vec![
            Value::String(name.to_string()),
            Value::Int(score),
            Value::Long(amount),
        ]
    }
}
