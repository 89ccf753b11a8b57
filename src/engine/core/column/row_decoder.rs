use std::io::Read;

use tracing::trace;

use crate::engine::core::column::{CodecContext, ColumnCodec, NullBitmap, RequirementMask};
use crate::engine::core::filter::FilterRow;
use crate::engine::core::stream::BlockletReader;
use crate::engine::errors::ScanError;
use crate::engine::schema::SegmentSchema;
use crate::engine::types::{MEMBER_DEFAULT_VAL, Value, no_dictionary};

/// Representation written into output slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputForm {
    /// Values converted to their declared types
    Typed,
    /// Stored form for re-encoding: key bytes, surrogates, nested bytes
    Raw,
}

struct ColumnPlan {
    codec: ColumnCodec,
    primitive_dimension: bool,
    filter_slot: Option<usize>,
    output_slots: Vec<usize>,
}

impl ColumnPlan {
    #[inline]
    fn is_required(&self) -> bool {
        self.filter_slot.is_some() || !self.output_slots.is_empty()
    }
}

/// Decodes rows of a buffered blocklet payload.
///
/// One plan per storage column, in storage order. Every column advances the
/// payload cursor by the same number of bytes whether it is decoded or
/// skipped, so required and skipped columns never drift apart.
pub struct RowDecoder {
    plans: Vec<ColumnPlan>,
    form: OutputForm,
    filter_row_len: usize,
    output_len: usize,
    null_bits: Vec<u8>,
}

impl RowDecoder {
    pub fn new(
        schema: &SegmentSchema,
        mask: &RequirementMask,
        form: OutputForm,
        ctx: CodecContext<'_>,
    ) -> Result<Self, ScanError> {
        let plans = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                Ok(ColumnPlan {
                    codec: ColumnCodec::for_column(column, mask.is_required(idx), ctx)?,
                    primitive_dimension: column.is_primitive_dimension(),
                    filter_slot: mask.filter_slot(idx),
                    output_slots: mask.projection_slots(idx).to_vec(),
                })
            })
            .collect::<Result<Vec<_>, ScanError>>()?;

        Ok(Self {
            plans,
            form,
            filter_row_len: mask.filter_row_len(),
            output_len: mask.output_len(),
            null_bits: Vec::new(),
        })
    }

    pub fn form(&self) -> OutputForm {
        self.form
    }

    pub fn column_count(&self) -> usize {
        self.plans.len()
    }

    /// Decodes the row at the reader's payload cursor into the filter row
    /// and output slots the mask asks for.
    pub fn decode_row<R: Read>(
        &mut self,
        reader: &mut BlockletReader<R>,
        filter_row: &mut FilterRow,
        output: &mut [Value],
    ) -> Result<(), ScanError> {
        if filter_row.len() < self.filter_row_len || output.len() < self.output_len {
            return Err(ScanError::InvalidProjection(format!(
                "row buffers too small: filter {} < {} or output {} < {}",
                filter_row.len(),
                self.filter_row_len,
                output.len(),
                self.output_len
            )));
        }

        let null_len = reader.read_u16()? as usize;
        if null_len > 0 {
            self.null_bits.clear();
            self.null_bits
                .extend_from_slice(reader.read_bytes(null_len)?);
        }
        let nulls = NullBitmap::new((null_len > 0).then_some(self.null_bits.as_slice()));

        for (idx, plan) in self.plans.iter().enumerate() {
            if nulls.is_null(idx) {
                write_null(plan, self.form, filter_row, output)?;
                continue;
            }
            if !plan.is_required() {
                plan.codec.skip(reader)?;
                continue;
            }
            decode_column(plan, self.form, reader, filter_row, output)?;
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(
                target: "segment_stream::column",
                offset = reader.payload_offset(),
                "Decoded row"
            );
        }
        Ok(())
    }
}

fn write_null(
    plan: &ColumnPlan,
    form: OutputForm,
    filter_row: &mut FilterRow,
    output: &mut [Value],
) -> Result<(), ScanError> {
    if let Some(slot) = plan.filter_slot {
        if plan.primitive_dimension {
            filter_row.set_bytes(slot, MEMBER_DEFAULT_VAL)?;
        } else {
            filter_row.set(slot, Value::Null)?;
        }
    }
    for &slot in &plan.output_slots {
        output[slot] = match form {
            OutputForm::Raw if plan.primitive_dimension => {
                Value::Bytes(MEMBER_DEFAULT_VAL.to_vec())
            }
            _ => Value::Null,
        };
    }
    Ok(())
}

fn decode_column<R: Read>(
    plan: &ColumnPlan,
    form: OutputForm,
    reader: &mut BlockletReader<R>,
    filter_row: &mut FilterRow,
    output: &mut [Value],
) -> Result<(), ScanError> {
    let value = match &plan.codec {
        ColumnCodec::NoDictionary(data_type) => {
            let len = reader.read_u16()? as usize;
            let bytes = reader.read_bytes(len)?;
            if let Some(slot) = plan.filter_slot {
                filter_row.set_bytes(slot, bytes)?;
            }
            if plan.output_slots.is_empty() {
                return Ok(());
            }
            match form {
                OutputForm::Typed => no_dictionary::decode(bytes, data_type)?,
                OutputForm::Raw => Value::Bytes(bytes.to_vec()),
            }
        }
        ColumnCodec::DirectDictionary(generator) => {
            if let Some(slot) = plan.filter_slot {
                filter_row.set_bytes(slot, reader.copy(4)?)?;
            }
            let surrogate = reader.read_int()?;
            match form {
                OutputForm::Typed => generator.value_of(surrogate)?,
                OutputForm::Raw => Value::Int(surrogate),
            }
        }
        ColumnCodec::Dictionary => {
            if let Some(slot) = plan.filter_slot {
                filter_row.set_bytes(slot, reader.copy(4)?)?;
            }
            Value::Int(reader.read_int()?)
        }
        ColumnCodec::Complex(decoder) => {
            let len = reader.read_u16()? as usize;
            let bytes = reader.read_bytes(len)?;
            if let Some(slot) = plan.filter_slot {
                filter_row.set_bytes(slot, bytes)?;
            }
            if plan.output_slots.is_empty() {
                return Ok(());
            }
            match (form, decoder) {
                (OutputForm::Raw, _) => Value::Bytes(bytes.to_vec()),
                (OutputForm::Typed, Some(decoder)) => decoder.decode(bytes)?,
                (OutputForm::Typed, None) => {
                    return Err(ScanError::ComplexDecode(
                        "required complex column has no decoder".to_string(),
                    ));
                }
            }
        }
        ColumnCodec::Measure(codec) => {
            let value = codec.read(reader)?;
            if let Some(slot) = plan.filter_slot {
                filter_row.set(slot, value.clone())?;
            }
            value
        }
    };

    assign(output, &plan.output_slots, value);
    Ok(())
}

/// Moves `value` into the last slot and clones it into the others.
fn assign(output: &mut [Value], slots: &[usize], value: Value) {
    if let Some((&last, rest)) = slots.split_last() {
        for &slot in rest {
            output[slot] = value.clone();
        }
        output[last] = value;
    }
}
