pub use super::factories::{
    CountingFilter, ExpressionFactory, NestedBytesFactory, RowFactory, SchemaFactory,
    SegmentFileFactory,
};

pub struct Factory;

impl Factory {
    pub fn schema() -> SchemaFactory {
        SchemaFactory::new()
    }

    pub fn row() -> RowFactory {
        RowFactory::new()
    }

    pub fn segment_file(schema: &crate::engine::schema::SegmentSchema) -> SegmentFileFactory {
        SegmentFileFactory::new(schema.clone())
    }

    pub fn expression() -> ExpressionFactory {
        ExpressionFactory::new()
    }
}
