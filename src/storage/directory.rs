//! Bucket directory
//!
//! `H` big-endian u32 slots directly after the header. Each slot is either the
//! empty sentinel or the region-relative offset of its chain's head record.

use crate::error::{ChainError, Result};

use super::file::DbFile;
use super::header::Layout;
use super::offset::RegionOffset;
use super::{EMPTY_SLOT, SLOT_SIZE};

/// Slots written per chunk when initialising a large directory
const INIT_CHUNK_SLOTS: usize = 16 * 1024;

/// Decoded directory slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Head(RegionOffset),
}

impl Slot {
    pub fn decode(raw: u32) -> Self {
        if raw == EMPTY_SLOT {
            Slot::Empty
        } else {
            Slot::Head(RegionOffset(raw))
        }
    }

    pub fn encode(self) -> u32 {
        match self {
            Slot::Empty => EMPTY_SLOT,
            Slot::Head(offset) => offset.0,
        }
    }
}

/// View of the bucket directory of one open file
#[derive(Clone, Copy)]
pub struct BucketDirectory<'a> {
    file: &'a DbFile,
    layout: &'a Layout,
}

impl<'a> BucketDirectory<'a> {
    pub fn new(file: &'a DbFile, layout: &'a Layout) -> Self {
        Self { file, layout }
    }

    /// Write `H` empty slots right after the header
    pub fn initialize(&self) -> Result<()> {
        let empty = EMPTY_SLOT.to_be_bytes();
        let total = self.layout.hash_table_size() as usize;
        let mut written = 0usize;

        while written < total {
            let n = (total - written).min(INIT_CHUNK_SLOTS);
            let chunk: Vec<u8> = empty.iter().copied().cycle().take(n * 4).collect();
            self.file
                .write_all_at(&chunk, self.layout.slot_pos(written as u32))?;
            written += n;
        }

        Ok(())
    }

    /// Read the slot of `bucket`
    pub fn read(&self, bucket: u32) -> Result<Slot> {
        let mut raw = [0u8; SLOT_SIZE as usize];
        self.file
            .read_exact_at(&mut raw, self.layout.slot_pos(bucket))
            .map_err(|e| {
                ChainError::eof_as_corrupt(e, || {
                    format!("bucket directory truncated at slot {}", bucket)
                })
            })?;
        Ok(Slot::decode(u32::from_be_bytes(raw)))
    }

    /// Point `bucket` at a new chain head
    pub fn write(&self, bucket: u32, slot: Slot) -> Result<()> {
        self.file
            .write_all_at(&slot.encode().to_be_bytes(), self.layout.slot_pos(bucket))?;
        Ok(())
    }
}
