pub mod codec;
pub mod null_bitmap;
pub mod requirement_mask;
pub mod row_decoder;

pub use codec::{CodecContext, ColumnCodec, MeasureCodec};
pub use null_bitmap::NullBitmap;
pub use requirement_mask::RequirementMask;
pub use row_decoder::{OutputForm, RowDecoder};
