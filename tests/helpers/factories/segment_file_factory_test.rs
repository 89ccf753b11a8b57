use std::io::Cursor;

use crate::engine::core::stream::BlockletHeader;
use crate::shared::storage_header::StreamFileHeader;
use crate::test_helpers::factories::{
    RowFactory, SchemaFactory, SegmentFileFactory, TEST_SYNC_MARKER,
};

#[test]
fn records_blocklet_offsets_at_markers() {
    let schema = SchemaFactory::mixed();
    let segment = SegmentFileFactory::new(schema)
        .with_blocklet(RowFactory::mixed_rows(0..3))
        .with_blocklet(RowFactory::mixed_rows(3..5))
        .create();

    assert_eq!(segment.blocklet_offsets.len(), 2);
    assert_eq!(segment.blocklet_offsets[0], segment.header_len);
    for offset in &segment.blocklet_offsets {
        let at = *offset as usize;
        assert_eq!(&segment.bytes[at..at + 16], &TEST_SYNC_MARKER);
    }

    let header = StreamFileHeader::read_from(Cursor::new(&segment.bytes), true).unwrap();
    assert_eq!(header.column_count, 12);
}

#[test]
fn blocklet_header_carries_row_count_and_bounds() {
    let schema = SchemaFactory::simple();
    let factory = SegmentFileFactory::new(schema);
    let rows = vec![
        RowFactory::simple("b", 5, 10),
        RowFactory::simple("a", 9, -4),
    ];
    let blocklet = factory.encode_blocklet(&rows);
    let header_len = i32::from_be_bytes(blocklet[16..20].try_into().unwrap()) as usize;
    let header = BlockletHeader::decode(&blocklet[20..20 + header_len]).unwrap();

    assert_eq!(header.row_count, 2);
    let index = header.min_max_index.unwrap();
    assert_eq!(index.min_values[0], b"a".to_vec());
    assert_eq!(index.max_values[0], b"b".to_vec());
    assert_eq!(index.min_values[2], (-4i64).to_be_bytes().to_vec());
    assert_eq!(index.max_values[2], 10i64.to_be_bytes().to_vec());
}
