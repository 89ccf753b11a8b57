use std::sync::Arc;

use arrow_array::builder::{
    BinaryBuilder, BooleanBuilder, Date32Builder, Decimal128Builder, Float64Builder,
    Int16Builder, Int32Builder, Int64Builder, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow_array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow_schema::{ArrowError, DataType as ArrowType, Field, Schema, SchemaRef, TimeUnit};
use tracing::debug;

use crate::engine::core::read::sink::{ColumnBatchSink, ColumnarBatchSink, OutputSchema};
use crate::engine::errors::SinkError;
use crate::engine::schema::DataType;
use crate::engine::types::Value;

/// Stages each blocklet in a [`ColumnBatchSink`] and turns it into an arrow
/// `RecordBatch` when the row count is finalized.
#[derive(Debug, Default)]
pub struct ArrowBatchSink {
    staging: ColumnBatchSink,
    schema: Option<SchemaRef>,
    batches: Vec<RecordBatch>,
}

impl ArrowBatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arrow_schema(&self) -> Option<&SchemaRef> {
        self.schema.as_ref()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn last_batch(&self) -> Option<&RecordBatch> {
        self.batches.last()
    }

    pub fn take_batches(&mut self) -> Vec<RecordBatch> {
        std::mem::take(&mut self.batches)
    }

    pub fn total_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

impl ColumnarBatchSink for ArrowBatchSink {
    fn on_schema(&mut self, schema: &OutputSchema) -> Result<(), SinkError> {
        self.staging.on_schema(schema)?;
        self.schema = Some(build_arrow_schema(schema));
        Ok(())
    }

    fn set_capacity(&mut self, capacity: usize) -> Result<(), SinkError> {
        self.staging.set_capacity(capacity)
    }

    fn put_value(&mut self, row: usize, value: Value, column: usize) -> Result<(), SinkError> {
        self.staging.put_value(row, value, column)
    }

    fn finalize_row_count(&mut self, count: usize) -> Result<(), SinkError> {
        self.staging.finalize_row_count(count)?;
        let schema = self.schema.clone().ok_or(SinkError::MissingSchema)?;

        let columns = self.staging.take_columns();
        let arrays = schema
            .fields()
            .iter()
            .zip(&columns)
            .enumerate()
            .map(|(idx, (field, values))| build_array(idx, field.data_type(), values))
            .collect::<Result<Vec<_>, SinkError>>()?;

        let options = RecordBatchOptions::new().with_row_count(Some(count));
        let batch = RecordBatch::try_new_with_options(schema, arrays, &options)
            .map_err(arrow_error)?;
        debug!(
            target: "segment_stream::sink",
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            "Built arrow record batch"
        );
        self.batches.push(batch);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.staging.close()
    }
}

pub fn build_arrow_schema(schema: &OutputSchema) -> SchemaRef {
    let fields = schema
        .fields()
        .iter()
        .map(|f| Field::new(&f.name, to_arrow_type(&f.data_type), true))
        .collect::<Vec<_>>();
    Arc::new(Schema::new(fields))
}

fn to_arrow_type(data_type: &DataType) -> ArrowType {
    match data_type {
        DataType::Boolean => ArrowType::Boolean,
        DataType::Short => ArrowType::Int16,
        DataType::Int => ArrowType::Int32,
        DataType::Long => ArrowType::Int64,
        DataType::Double => ArrowType::Float64,
        DataType::Decimal { precision, scale } => ArrowType::Decimal128(*precision, *scale),
        DataType::String => ArrowType::Utf8,
        DataType::Binary => ArrowType::Binary,
        DataType::Date => ArrowType::Date32,
        DataType::Timestamp => ArrowType::Timestamp(TimeUnit::Microsecond, None),
        // Nested values are rendered as JSON text
        DataType::Array | DataType::Struct => ArrowType::Utf8,
    }
}

fn build_array(
    column: usize,
    arrow_type: &ArrowType,
    values: &[Value],
) -> Result<ArrayRef, SinkError> {
    let mismatch = |value: &Value| SinkError::UnsupportedValue {
        column,
        value: value.type_name(),
    };
    let len = values.len();

    match arrow_type {
        ArrowType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Boolean(b) => builder.append_value(*b),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Int16 => {
            let mut builder = Int16Builder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Short(v) => builder.append_value(*v),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Int32 => {
            let mut builder = Int32Builder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Int(v) => builder.append_value(*v),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Int64 => {
            let mut builder = Int64Builder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Long(v) => builder.append_value(*v),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Float64 => {
            let mut builder = Float64Builder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Double(v) => builder.append_value(*v),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Decimal128(precision, scale) => {
            let mut builder = Decimal128Builder::with_capacity(len)
                .with_precision_and_scale(*precision, *scale)
                .map_err(arrow_error)?;
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Decimal(d) => {
                        let rescaled = d.rescaled(*scale).ok_or_else(|| mismatch(value))?;
                        builder.append_value(rescaled.unscaled);
                    }
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Binary => {
            let mut builder = BinaryBuilder::with_capacity(len, len * 8);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Bytes(b) => builder.append_value(b),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Date32 => {
            let mut builder = Date32Builder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Date(days) => builder.append_value(*days),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Timestamp(TimeUnit::Microsecond, _) => {
            let mut builder = TimestampMicrosecondBuilder::with_capacity(len);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::Timestamp(micros) => builder.append_value(*micros),
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        ArrowType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(len, len * 8);
            for value in values {
                match value {
                    Value::Null => builder.append_null(),
                    Value::String(s) => builder.append_value(s),
                    Value::Array(_) | Value::Struct(_) => {
                        builder.append_value(nested_to_json(value).to_string())
                    }
                    other => return Err(mismatch(other)),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        other => Err(SinkError::Arrow(format!("unsupported arrow type {other}"))),
    }
}

/// Plain JSON rendering of a nested value; struct fields are positional.
fn nested_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Short(v) => Json::from(*v),
        Value::Int(v) => Json::from(*v),
        Value::Long(v) => Json::from(*v),
        Value::Double(v) => Json::from(*v),
        Value::Decimal(d) => Json::String(d.to_string()),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(String::from_utf8_lossy(b).into_owned()),
        Value::Date(days) => Json::from(*days),
        Value::Timestamp(micros) => Json::from(*micros),
        Value::Array(items) | Value::Struct(items) => {
            Json::Array(items.iter().map(nested_to_json).collect())
        }
    }
}

fn arrow_error(err: ArrowError) -> SinkError {
    SinkError::Arrow(err.to_string())
}
