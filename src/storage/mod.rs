//! Storage Module
//!
//! On-disk layout of a ChainDB file and the codecs for each zone.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Header (16 bytes)                                           │
//! │   Magic: "NDB" (3) | Version (1) | H (4) | K (4) | V (4)    │
//! │   (all integers big-endian u32)                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Bucket Directory (4 * H bytes)                              │
//! │   [Slot: u32 BE] ... H times                                │
//! │   (0xFFFFFFFF = empty, otherwise offset from region start)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Record Region (grows by appending)                          │
//! │   [Flag (1)][Link: u32 BE (4)][Key (K)][Value (V)]          │
//! │   ... repeated ...                                          │
//! │   (Link = delta from this record to the next, 0 = tail)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod directory;
mod file;
mod header;
mod offset;
mod record;

pub use directory::{BucketDirectory, Slot};
pub use file::DbFile;
pub use header::{Header, Layout};
pub use offset::{ChainLink, FilePos, RecordRegion, RegionOffset};
pub use record::{encode_tail, RecordHeader, RecordProbe, RecordState, Records};

// =============================================================================
// Shared Constants (used by header, directory, record codecs)
// =============================================================================

/// Magic bytes identifying a ChainDB file
pub const MAGIC: &[u8; 3] = b"NDB";

/// Current file format version
pub const VERSION: u8 = 1;

/// Header size: Magic (3) + Version (1) + H (4) + K (4) + V (4) = 16 bytes
pub const HEADER_SIZE: u64 = 16;

/// Size of one bucket directory slot
pub const SLOT_SIZE: u64 = 4;

/// Directory slot value marking an empty bucket
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Record prefix before the key: Flag (1) + Link (4) = 5 bytes
pub const RECORD_PREFIX_SIZE: u64 = 5;

/// Flag byte of a live record
pub const FLAG_ACTIVE: u8 = 0x01;

/// Flag byte of a tombstoned record
pub const FLAG_TOMBSTONE: u8 = 0x00;
