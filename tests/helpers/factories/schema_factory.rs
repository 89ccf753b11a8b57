use crate::engine::schema::{DataType, SegmentSchema, StorageColumn};

/// Builds segment schemas for tests.
pub struct SchemaFactory {
    columns: Vec<StorageColumn>,
}

impl SchemaFactory {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: StorageColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn create(self) -> SegmentSchema {
        SegmentSchema::new(self.columns).expect("valid test schema")
    }

    /// One column of every encoding:
    ///
    /// | idx | name    | encoding           | type           | ordinal |
    /// |-----|---------|--------------------|----------------|---------|
    /// | 0   | id      | no-dictionary      | string         | d0      |
    /// | 1   | age     | no-dictionary      | int            | d1      |
    /// | 2   | day     | direct dictionary  | date           | d2      |
    /// | 3   | ts      | direct dictionary  | timestamp      | d3      |
    /// | 4   | country | dictionary         | string         | d4      |
    /// | 5   | tags    | complex            | array<string>  | d5      |
    /// | 6   | flag    | measure            | boolean        | m0      |
    /// | 7   | qty     | measure            | short          | m1      |
    /// | 8   | count   | measure            | int            | m2      |
    /// | 9   | total   | measure            | long           | m3      |
    /// | 10  | price   | measure            | double         | m4      |
    /// | 11  | amount  | measure            | decimal(10,2)  | m5      |
    pub fn mixed() -> SegmentSchema {
        Self::new()
            .with_column(StorageColumn::no_dictionary("id", 0, DataType::String))
            .with_column(StorageColumn::no_dictionary("age", 1, DataType::Int))
            .with_column(StorageColumn::direct_dictionary("day", 2, DataType::Date))
            .with_column(StorageColumn::direct_dictionary("ts", 3, DataType::Timestamp))
            .with_column(StorageColumn::dictionary("country", 4, DataType::String))
            .with_column(StorageColumn::complex(
                "tags",
                5,
                DataType::Array,
                vec![StorageColumn::no_dictionary("tags.val", 6, DataType::String)],
            ))
            .with_column(StorageColumn::measure("flag", 0, DataType::Boolean))
            .with_column(StorageColumn::measure("qty", 1, DataType::Short))
            .with_column(StorageColumn::measure("count", 2, DataType::Int))
            .with_column(StorageColumn::measure("total", 3, DataType::Long))
            .with_column(StorageColumn::measure("price", 4, DataType::Double))
            .with_column(StorageColumn::measure(
                "amount",
                5,
                DataType::Decimal {
                    precision: 10,
                    scale: 2,
                },
            ))
            .create()
    }

    /// `name` string key, `score` int key, `amount` long measure.
    pub fn simple() -> SegmentSchema {
        Self::new()
            .with_column(StorageColumn::no_dictionary("name", 0, DataType::String))
            .with_column(StorageColumn::no_dictionary("score", 1, DataType::Int))
            .with_column(StorageColumn::measure("amount", 0, DataType::Long))
            .create()
    }
}
