//! Record codec
//!
//! A record is `[Flag (1)][Link: u32 BE (4)][Key (K)][Value (V)]`. Records are
//! never moved or removed: deleting clears the flag, reusing rewrites flag, key
//! and value in place, and the link field always stays part of the chain.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ChainError, Result};

use super::file::DbFile;
use super::header::Layout;
use super::offset::{ChainLink, FilePos};
use super::{FLAG_ACTIVE, FLAG_TOMBSTONE, RECORD_PREFIX_SIZE};

/// Liveness of a record slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Active,
    Tombstoned,
}

impl RecordState {
    /// Only bit 0 of the flag byte is meaningful
    pub fn from_flag(flag: u8) -> Self {
        if flag & FLAG_ACTIVE == FLAG_ACTIVE {
            RecordState::Active
        } else {
            RecordState::Tombstoned
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            RecordState::Active => FLAG_ACTIVE,
            RecordState::Tombstoned => FLAG_TOMBSTONE,
        }
    }
}

/// Flag and link: the fixed prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub state: RecordState,
    pub link: ChainLink,
}

impl RecordHeader {
    pub fn decode(buf: &mut impl Buf) -> Self {
        let state = RecordState::from_flag(buf.get_u8());
        let link = ChainLink(buf.get_u32());
        Self { state, link }
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.state.flag());
        buf.put_u32(self.link.0);
    }
}

/// Header and key of a record, as read while walking a chain
#[derive(Debug, Clone)]
pub struct RecordProbe {
    pub header: RecordHeader,
    pub key: Bytes,
}

impl RecordProbe {
    /// A live record holding exactly `key`
    pub fn matches(&self, key: &[u8]) -> bool {
        self.header.state == RecordState::Active && self.key.as_ref() == key
    }

    pub fn is_tombstone(&self) -> bool {
        self.header.state == RecordState::Tombstoned
    }
}

/// Encode a fresh chain tail: active, no successor
pub fn encode_tail(key: &[u8], value: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(RECORD_PREFIX_SIZE as usize + key.len() + value.len());
    RecordHeader {
        state: RecordState::Active,
        link: ChainLink::END,
    }
    .encode(&mut buf);
    buf.put_slice(key);
    buf.put_slice(value);
    buf.freeze()
}

/// Record-level reads and writes against one open file
#[derive(Clone, Copy)]
pub struct Records<'a> {
    file: &'a DbFile,
    layout: &'a Layout,
}

impl<'a> Records<'a> {
    pub fn new(file: &'a DbFile, layout: &'a Layout) -> Self {
        Self { file, layout }
    }

    /// Read flag, link and key of the record at `pos`
    pub fn probe(&self, pos: FilePos) -> Result<RecordProbe> {
        let mut buf = BytesMut::zeroed(self.layout.probe_len());
        self.file
            .read_exact_at(&mut buf, pos)
            .map_err(|e| ChainError::eof_as_corrupt(e, || format!("record {} is truncated", pos)))?;

        let header = RecordHeader::decode(&mut &buf[..RECORD_PREFIX_SIZE as usize]);
        let key = buf.split_off(RECORD_PREFIX_SIZE as usize).freeze();
        Ok(RecordProbe { header, key })
    }

    /// Read the value bytes of the record at `pos`
    pub fn read_value(&self, pos: FilePos) -> Result<Vec<u8>> {
        let mut value = vec![0u8; self.layout.value_size() as usize];
        self.file
            .read_exact_at(&mut value, self.layout.value_pos(pos))
            .map_err(|e| ChainError::eof_as_corrupt(e, || format!("record {} is truncated", pos)))?;
        Ok(value)
    }

    /// Append a new chain tail at end-of-file and return its position
    ///
    /// Fails with `RegionFull` when the new position could not be stored in a
    /// directory slot or link field.
    pub fn append(&self, key: &[u8], value: &[u8]) -> Result<FilePos> {
        let pos = FilePos(self.file.len()?);
        if pos.get() < self.layout.min_file_len() {
            return Err(ChainError::CorruptFile(format!(
                "file ends at {} inside the bucket directory",
                pos
            )));
        }
        self.layout.region().offset_of(pos)?;

        self.file.write_all_at(&encode_tail(key, value), pos)?;
        Ok(pos)
    }

    /// Rewrite only the value bytes of the record at `pos`
    pub fn overwrite_value(&self, pos: FilePos, value: &[u8]) -> Result<()> {
        self.file.write_all_at(value, self.layout.value_pos(pos))?;
        Ok(())
    }

    /// Revive a tombstoned record with a new key and value, keeping its link
    pub fn reuse(&self, pos: FilePos, key: &[u8], value: &[u8]) -> Result<()> {
        let mut payload = BytesMut::with_capacity(key.len() + value.len());
        payload.put_slice(key);
        payload.put_slice(value);

        self.file.write_all_at(&payload, self.layout.key_pos(pos))?;
        self.file
            .write_all_at(&[RecordState::Active.flag()], pos)?;
        Ok(())
    }

    /// Clear the flag byte of the record at `pos`
    pub fn tombstone(&self, pos: FilePos) -> Result<()> {
        self.file
            .write_all_at(&[RecordState::Tombstoned.flag()], pos)?;
        Ok(())
    }

    /// Point the record at `pos` to a successor
    pub fn write_link(&self, pos: FilePos, link: ChainLink) -> Result<()> {
        self.file
            .write_all_at(&link.0.to_be_bytes(), pos.offset_by(1))?;
        Ok(())
    }
}
