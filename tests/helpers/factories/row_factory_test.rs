use crate::engine::types::Value;
use crate::test_helpers::factories::{RowFactory, SchemaFactory};

#[test]
fn create_places_values_in_storage_order() {
    let schema = SchemaFactory::simple();
    let row = RowFactory::new()
        .with("amount", Value::Long(7))
        .with("NAME", Value::String("x".into()))
        .create(&schema);
    assert_eq!(
        row,
        vec![Value::String("x".into()), Value::Null, Value::Long(7)]
    );
}

#[test]
fn mixed_rows_match_mixed_schema_width() {
    let schema = SchemaFactory::mixed();
    for row in RowFactory::mixed_rows(0..20) {
        assert_eq!(row.len(), schema.len());
    }
    assert!(RowFactory::mixed(3)[1].is_null());
}
