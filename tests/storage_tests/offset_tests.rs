//! Tests for the offset newtypes
//!
//! Directory offsets are anchored at the record region start, chain links at
//! the owning record. Mixing the two anchors is the bug these guard against.

use chaindb::storage::{ChainLink, FilePos, RecordRegion, RegionOffset};
use chaindb::ChainError;

#[test]
fn test_region_resolve_and_offset_of() {
    let region = RecordRegion::new(FilePos(32));

    assert_eq!(region.resolve(RegionOffset(0)), FilePos(32));
    assert_eq!(region.resolve(RegionOffset(77)), FilePos(109));
    assert_eq!(region.offset_of(FilePos(109)).unwrap(), RegionOffset(77));
}

#[test]
fn test_region_offset_before_start_is_corrupt() {
    let region = RecordRegion::new(FilePos(32));
    assert!(matches!(
        region.offset_of(FilePos(31)),
        Err(ChainError::CorruptFile(_))
    ));
}

#[test]
fn test_region_offset_cannot_reach_sentinel() {
    let region = RecordRegion::new(FilePos(32));

    let last = FilePos(32 + RecordRegion::MAX_OFFSET as u64);
    assert_eq!(
        region.offset_of(last).unwrap(),
        RegionOffset(0xFFFF_FFFE)
    );
    assert!(matches!(
        region.offset_of(last.offset_by(1)),
        Err(ChainError::RegionFull(_))
    ));
}

#[test]
fn test_chain_link_is_relative_to_predecessor() {
    let link = ChainLink::between(FilePos(109), FilePos(186)).unwrap();
    assert_eq!(link, ChainLink(77));
    assert_eq!(link.follow(FilePos(109)), Some(FilePos(186)));
}

#[test]
fn test_chain_link_end() {
    assert!(ChainLink::END.is_end());
    assert_eq!(ChainLink::END.follow(FilePos(500)), None);
}

#[test]
fn test_chain_link_rejects_backward_or_self() {
    assert!(matches!(
        ChainLink::between(FilePos(200), FilePos(100)),
        Err(ChainError::CorruptFile(_))
    ));
    assert!(matches!(
        ChainLink::between(FilePos(200), FilePos(200)),
        Err(ChainError::CorruptFile(_))
    ));
}
