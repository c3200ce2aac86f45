//! Tests for the header codec and derived layout

use chaindb::storage::{FilePos, Header, RegionOffset, Slot, EMPTY_SLOT, HEADER_SIZE};
use chaindb::ChainError;

#[test]
fn test_header_encodes_big_endian() {
    let header = Header::new(4, 8, 64).unwrap();
    let bytes = header.encode();

    assert_eq!(bytes.len(), HEADER_SIZE as usize);
    assert_eq!(&bytes[0..3], b"NDB");
    assert_eq!(bytes[3], 1);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 4]);
    assert_eq!(&bytes[8..12], &[0, 0, 0, 8]);
    assert_eq!(&bytes[12..16], &[0, 0, 0, 64]);
}

#[test]
fn test_header_decode_reads_sizes() {
    let header = Header::new(1024, 16, 300).unwrap();
    let decoded = Header::decode(&header.encode()).unwrap();
    assert_eq!(decoded, header);
    assert_eq!(decoded.hash_table_size(), 1024);
    assert_eq!(decoded.key_size(), 16);
    assert_eq!(decoded.value_size(), 300);
}

#[test]
fn test_header_new_rejects_zero_sizes() {
    for (h, k, v) in [(0, 8, 64), (4, 0, 64), (4, 8, 0)] {
        assert!(matches!(
            Header::new(h, k, v),
            Err(ChainError::InvalidParameters(_))
        ));
    }
}

#[test]
fn test_header_decode_rejects_bad_magic() {
    let mut bytes = Header::new(4, 8, 64).unwrap().encode();
    bytes[0] = b'X';
    assert!(matches!(
        Header::decode(&bytes),
        Err(ChainError::CorruptFile(_))
    ));
}

#[test]
fn test_header_decode_rejects_bad_version() {
    let mut bytes = Header::new(4, 8, 64).unwrap().encode();
    bytes[3] = 2;
    assert!(matches!(
        Header::decode(&bytes),
        Err(ChainError::CorruptFile(_))
    ));
}

#[test]
fn test_header_decode_rejects_zero_fields() {
    for field in [4usize, 8, 12] {
        let mut bytes = Header::new(4, 8, 64).unwrap().encode();
        bytes[field..field + 4].copy_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            Header::decode(&bytes),
            Err(ChainError::CorruptFile(_))
        ));
    }
}

#[test]
fn test_header_decode_rejects_short_input() {
    assert!(matches!(
        Header::decode(b"NDB\x01"),
        Err(ChainError::CorruptFile(_))
    ));
}

#[test]
fn test_layout_geometry() {
    let layout = Header::new(4, 8, 64).unwrap().layout();

    assert_eq!(layout.directory_len(), 16);
    assert_eq!(layout.min_file_len(), 32);
    assert_eq!(layout.region().start(), FilePos(32));
    assert_eq!(layout.record_len(), 1 + 4 + 8 + 64);
    assert_eq!(layout.probe_len(), 13);
    assert_eq!(layout.slot_pos(0), FilePos(16));
    assert_eq!(layout.slot_pos(3), FilePos(28));
    assert_eq!(layout.key_pos(FilePos(32)), FilePos(37));
    assert_eq!(layout.value_pos(FilePos(32)), FilePos(45));
}

#[test]
fn test_slot_codec() {
    assert_eq!(Slot::decode(EMPTY_SLOT), Slot::Empty);
    assert_eq!(Slot::decode(0), Slot::Head(RegionOffset(0)));
    assert_eq!(Slot::Head(RegionOffset(77)).encode(), 77);
    assert_eq!(Slot::Empty.encode(), 0xFFFF_FFFF);
}
