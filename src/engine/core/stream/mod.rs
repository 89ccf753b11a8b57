pub mod blocklet_header;
pub mod blocklet_reader;
pub mod split;

pub use blocklet_header::{BlockletHeader, MinMaxIndex};
pub use blocklet_reader::BlockletReader;
pub use split::{FileSegmentSource, MemorySegmentSource, SegmentSource, StreamSplit};
