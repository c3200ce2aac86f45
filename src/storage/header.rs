//! File header codec and derived layout
//!
//! The header is written once when the file is created and never changes.

use bytes::{Buf, BufMut};

use crate::error::{ChainError, Result};

use super::offset::{FilePos, RecordRegion};
use super::{HEADER_SIZE, MAGIC, RECORD_PREFIX_SIZE, SLOT_SIZE, VERSION};

/// Decoded file header: the three immutable size parameters
///
/// Only built through [`Header::new`] or [`Header::decode`], so every size is
/// non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of bucket directory slots (`H`)
    hash_table_size: u32,
    /// Key size in bytes (`K`)
    key_size: u32,
    /// Value size in bytes (`V`)
    value_size: u32,
}

impl Header {
    /// Header for a new file; every size must be non-zero
    pub fn new(hash_table_size: u32, key_size: u32, value_size: u32) -> Result<Self> {
        if hash_table_size == 0 || key_size == 0 || value_size == 0 {
            return Err(ChainError::InvalidParameters(format!(
                "hash_table_size={}, key_size={}, value_size={} (all must be > 0)",
                hash_table_size, key_size, value_size
            )));
        }
        Ok(Self {
            hash_table_size,
            key_size,
            value_size,
        })
    }

    /// Encode to the 16-byte on-disk form
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut out = [0u8; HEADER_SIZE as usize];
        let mut buf = &mut out[..];
        buf.put_slice(MAGIC);
        buf.put_u8(VERSION);
        buf.put_u32(self.hash_table_size);
        buf.put_u32(self.key_size);
        buf.put_u32(self.value_size);
        out
    }

    /// Decode and validate a header read from an existing file
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE as usize {
            return Err(ChainError::CorruptFile(format!(
                "header is {} bytes, expected {}",
                bytes.len(),
                HEADER_SIZE
            )));
        }

        let mut buf = bytes;
        let mut magic = [0u8; 3];
        buf.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(ChainError::CorruptFile(format!(
                "invalid magic: expected {:?}, got {:?}",
                MAGIC, magic
            )));
        }

        let version = buf.get_u8();
        if version != VERSION {
            return Err(ChainError::CorruptFile(format!(
                "unsupported format version: {}",
                version
            )));
        }

        let hash_table_size = buf.get_u32();
        let key_size = buf.get_u32();
        let value_size = buf.get_u32();

        if hash_table_size == 0 || key_size == 0 || value_size == 0 {
            return Err(ChainError::CorruptFile(format!(
                "zero size field in header: hash_table_size={}, key_size={}, value_size={}",
                hash_table_size, key_size, value_size
            )));
        }

        Ok(Self {
            hash_table_size,
            key_size,
            value_size,
        })
    }

    pub fn hash_table_size(&self) -> u32 {
        self.hash_table_size
    }

    pub fn key_size(&self) -> u32 {
        self.key_size
    }

    pub fn value_size(&self) -> u32 {
        self.value_size
    }

    pub fn layout(&self) -> Layout {
        Layout::new(*self)
    }
}

/// Byte geometry derived from a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    header: Header,
    region: RecordRegion,
}

impl Layout {
    pub fn new(header: Header) -> Self {
        let region = RecordRegion::new(FilePos(
            HEADER_SIZE + header.hash_table_size as u64 * SLOT_SIZE,
        ));
        Self { header, region }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn hash_table_size(&self) -> u32 {
        self.header.hash_table_size
    }

    pub fn key_size(&self) -> u32 {
        self.header.key_size
    }

    pub fn value_size(&self) -> u32 {
        self.header.value_size
    }

    /// Length of the bucket directory in bytes (`4 * H`)
    pub fn directory_len(&self) -> u64 {
        self.header.hash_table_size as u64 * SLOT_SIZE
    }

    pub fn region(&self) -> &RecordRegion {
        &self.region
    }

    /// Smallest valid file length: header plus a complete directory
    pub fn min_file_len(&self) -> u64 {
        self.region.start().get()
    }

    /// Full on-disk size of one record
    pub fn record_len(&self) -> u64 {
        RECORD_PREFIX_SIZE + self.header.key_size as u64 + self.header.value_size as u64
    }

    /// Bytes read when probing a record: flag, link and key
    pub fn probe_len(&self) -> usize {
        RECORD_PREFIX_SIZE as usize + self.header.key_size as usize
    }

    /// Absolute position of a bucket's directory slot
    pub fn slot_pos(&self, bucket: u32) -> FilePos {
        FilePos(HEADER_SIZE + bucket as u64 * SLOT_SIZE)
    }

    /// Absolute position of a record's key bytes
    pub fn key_pos(&self, record: FilePos) -> FilePos {
        record.offset_by(RECORD_PREFIX_SIZE)
    }

    /// Absolute position of a record's value bytes
    pub fn value_pos(&self, record: FilePos) -> FilePos {
        record.offset_by(RECORD_PREFIX_SIZE + self.header.key_size as u64)
    }
}
