//! Offset newtypes
//!
//! The file is an arena addressed by byte offsets. Three kinds exist and must
//! never be mixed up:
//!
//! - [`FilePos`]: absolute byte position in the file
//! - [`RegionOffset`]: delta from the start of the record region (stored in the
//!   bucket directory)
//! - [`ChainLink`]: delta from a record's own position to its successor (stored
//!   in the record's link field, `0` = end of chain)

use std::fmt;

use crate::error::{ChainError, Result};

/// Absolute byte position in the database file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilePos(pub u64);

impl FilePos {
    pub fn get(self) -> u64 {
        self.0
    }

    /// Position `n` bytes further into the file
    pub fn offset_by(self, n: u64) -> FilePos {
        FilePos(self.0 + n)
    }
}

impl fmt::Display for FilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Offset of a record relative to the start of the record region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionOffset(pub u32);

/// Relative link from a record to the next record in its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink(pub u32);

impl ChainLink {
    /// Link value marking the chain tail
    pub const END: ChainLink = ChainLink(0);

    pub fn is_end(self) -> bool {
        self.0 == 0
    }

    /// Link stored in the record at `from` so that it points at `to`
    ///
    /// Records are only ever appended after every existing record, so `to` is
    /// strictly greater than `from`.
    pub fn between(from: FilePos, to: FilePos) -> Result<ChainLink> {
        if to <= from {
            return Err(ChainError::CorruptFile(format!(
                "backward chain link from {} to {}",
                from, to
            )));
        }
        let delta = to.0 - from.0;
        u32::try_from(delta)
            .map(ChainLink)
            .map_err(|_| ChainError::RegionFull(delta))
    }

    /// Successor position of the record at `from`, or `None` at the tail
    pub fn follow(self, from: FilePos) -> Option<FilePos> {
        if self.is_end() {
            None
        } else {
            Some(from.offset_by(self.0 as u64))
        }
    }
}

/// The record region: everything after the header and bucket directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRegion {
    start: FilePos,
}

impl RecordRegion {
    /// Largest region offset that does not collide with the empty-slot sentinel
    pub const MAX_OFFSET: u32 = u32::MAX - 1;

    pub fn new(start: FilePos) -> Self {
        Self { start }
    }

    pub fn start(&self) -> FilePos {
        self.start
    }

    /// Absolute position of a record addressed by a directory slot
    pub fn resolve(&self, offset: RegionOffset) -> FilePos {
        self.start.offset_by(offset.0 as u64)
    }

    /// Directory encoding of the record at `pos`
    pub fn offset_of(&self, pos: FilePos) -> Result<RegionOffset> {
        let delta = pos.0.checked_sub(self.start.0).ok_or_else(|| {
            ChainError::CorruptFile(format!(
                "record position {} precedes the record region {}",
                pos, self.start
            ))
        })?;
        if delta > Self::MAX_OFFSET as u64 {
            return Err(ChainError::RegionFull(delta));
        }
        Ok(RegionOffset(delta as u32))
    }
}
