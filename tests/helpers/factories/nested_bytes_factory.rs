use crate::engine::core::dictionary::DirectDictionaryGenerator;
use crate::engine::schema::{ColumnEncoding, DataType, StorageColumn};
use crate::engine::types::{Value, no_dictionary};
use crate::shared::config::DirectDictionaryConfig;

/// Writes nested values in the layout `NestedTypeDecoder` reads.
pub struct NestedBytesFactory;

impl NestedBytesFactory {
    pub fn encode(column: &StorageColumn, value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        Self::write(column, value, &mut out);
        out
    }

    fn write(column: &StorageColumn, value: &Value, out: &mut Vec<u8>) {
        match (column.encoding, &column.data_type, value) {
            (ColumnEncoding::Complex, DataType::Array, Value::Array(items)) => {
                out.extend_from_slice(&(items.len() as i32).to_be_bytes());
                for item in items {
                    Self::write(&column.children[0], item, out);
                }
            }
            (ColumnEncoding::Complex, DataType::Struct, Value::Struct(fields)) => {
                out.extend_from_slice(&(fields.len() as i16).to_be_bytes());
                for (child, field) in column.children.iter().zip(fields) {
                    Self::write(child, field, out);
                }
            }
            (ColumnEncoding::DirectDictionary, data_type, v) => {
                let generator = DirectDictionaryGenerator::for_type(
                    data_type,
                    &DirectDictionaryConfig::default(),
                )
                .unwrap();
                out.extend_from_slice(&generator.surrogate_for(v).unwrap().to_be_bytes());
            }
            (ColumnEncoding::Dictionary, _, Value::Int(surrogate)) => {
                out.extend_from_slice(&surrogate.to_be_bytes());
            }
            (ColumnEncoding::NoDictionary, data_type, v) => {
                let key = no_dictionary::encode(v, data_type).unwrap();
                out.extend_from_slice(&(key.len() as u16).to_be_bytes());
                out.extend_from_slice(&key);
            }
            (encoding, data_type, v) => {
                panic!("cannot nest {v:?} as {encoding:?}/{data_type:?}")
            }
        }
    }
}
