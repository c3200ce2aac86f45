//! Chain Engine
//!
//! Hashes a key to its bucket, walks the bucket's chain and applies get / put /
//! delete directly against the file. Nothing is cached: every call re-reads the
//! directory slot and the records it needs.
//!
//! ## Walk
//! ```text
//! directory[bucket] ──► head ──link──► record ──link──► tail (link = 0)
//! ```
//! One walk classifies the bucket as a [`Probe`]; each operation is a match on
//! that result.
//!
//! ## Known limitation
//! Appending a record and linking it into its chain are two separate writes.
//! A crash (or an unsynchronised second writer) between them leaves an orphaned
//! record or a shortened chain. Such damage is not detected or repaired.

use tracing::trace;

use crate::error::Result;
use crate::hash::bucket_for;
use crate::storage::{
    BucketDirectory, ChainLink, DbFile, FilePos, Layout, RecordProbe, Records, Slot,
};

/// Where a key lives in (or would go into) its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The directory slot is empty
    EmptyBucket { bucket: u32 },

    /// A live record holds the key
    Found { bucket: u32, pos: FilePos },

    /// Walked to the tail without a match; `free` is the first tombstone seen
    Missing {
        bucket: u32,
        tail: FilePos,
        free: Option<FilePos>,
    },
}

/// How a put was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// New record written at end-of-file
    Appended(FilePos),

    /// Existing record's value rewritten in place
    Updated(FilePos),

    /// Tombstoned record revived in place
    Reused(FilePos),
}

/// Chain operations over one open file
#[derive(Clone, Copy)]
pub struct Chain<'a> {
    layout: &'a Layout,
    directory: BucketDirectory<'a>,
    records: Records<'a>,
}

impl<'a> Chain<'a> {
    pub fn new(file: &'a DbFile, layout: &'a Layout) -> Self {
        Self {
            layout,
            directory: BucketDirectory::new(file, layout),
            records: Records::new(file, layout),
        }
    }

    /// Absolute position of a bucket's head record, if any
    pub fn head(&self, bucket: u32) -> Result<Option<FilePos>> {
        Ok(match self.directory.read(bucket)? {
            Slot::Empty => None,
            Slot::Head(offset) => Some(self.layout.region().resolve(offset)),
        })
    }

    /// Walk the chain of `key`'s bucket once
    pub fn probe(&self, key: &[u8]) -> Result<Probe> {
        let bucket = bucket_for(key, self.layout.hash_table_size());

        let mut pos = match self.head(bucket)? {
            Some(head) => head,
            None => return Ok(Probe::EmptyBucket { bucket }),
        };

        let mut free = None;
        loop {
            let record = self.records.probe(pos)?;

            if record.matches(key) {
                return Ok(Probe::Found { bucket, pos });
            }

            if record.is_tombstone() && free.is_none() {
                free = Some(pos);
            }

            match record.header.link.follow(pos) {
                Some(next) => pos = next,
                None => {
                    return Ok(Probe::Missing {
                        bucket,
                        tail: pos,
                        free,
                    })
                }
            }
        }
    }

    /// Value of `key`, or `None` if no live record holds it
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.probe(key)? {
            Probe::Found { pos, .. } => Ok(Some(self.records.read_value(pos)?)),
            Probe::EmptyBucket { .. } | Probe::Missing { .. } => Ok(None),
        }
    }

    /// Insert or update `key`
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<PutOutcome> {
        let outcome = match self.probe(key)? {
            Probe::EmptyBucket { bucket } => {
                let pos = self.records.append(key, value)?;
                let offset = self.layout.region().offset_of(pos)?;
                self.directory.write(bucket, Slot::Head(offset))?;
                trace!(bucket, pos = pos.get(), "appended chain head");
                PutOutcome::Appended(pos)
            }
            Probe::Found { pos, .. } => {
                self.records.overwrite_value(pos, value)?;
                PutOutcome::Updated(pos)
            }
            Probe::Missing {
                bucket,
                free: Some(slot),
                ..
            } => {
                self.records.reuse(slot, key, value)?;
                trace!(bucket, pos = slot.get(), "reused tombstoned record");
                PutOutcome::Reused(slot)
            }
            Probe::Missing {
                bucket,
                tail,
                free: None,
            } => {
                let pos = self.records.append(key, value)?;
                self.records
                    .write_link(tail, ChainLink::between(tail, pos)?)?;
                trace!(bucket, pos = pos.get(), tail = tail.get(), "appended chain tail");
                PutOutcome::Appended(pos)
            }
        };

        Ok(outcome)
    }

    /// Tombstone `key`; returns whether a live record was found
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        match self.probe(key)? {
            Probe::Found { bucket, pos } => {
                self.records.tombstone(pos)?;
                trace!(bucket, pos = pos.get(), "tombstoned record");
                Ok(true)
            }
            Probe::EmptyBucket { .. } | Probe::Missing { .. } => Ok(false),
        }
    }

    /// Iterate every record (live and tombstoned) of one bucket in chain order
    pub fn records(&self, bucket: u32) -> Result<ChainCursor<'a>> {
        Ok(ChainCursor {
            records: self.records,
            next: self.head(bucket)?,
        })
    }

    /// Iterate every live entry of the file, bucket by bucket
    pub fn entries(&self) -> Entries<'a> {
        Entries {
            chain: *self,
            bucket: 0,
            cursor: None,
            failed: false,
        }
    }

    pub fn read_value(&self, pos: FilePos) -> Result<Vec<u8>> {
        self.records.read_value(pos)
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// Cursor over the records of a single chain
pub struct ChainCursor<'a> {
    records: Records<'a>,
    next: Option<FilePos>,
}

impl<'a> Iterator for ChainCursor<'a> {
    type Item = Result<(FilePos, RecordProbe)>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.next.take()?;
        match self.records.probe(pos) {
            Ok(record) => {
                self.next = record.header.link.follow(pos);
                Some(Ok((pos, record)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Iterator over all live `(key, value)` pairs
///
/// Stops after the first error.
pub struct Entries<'a> {
    chain: Chain<'a>,
    bucket: u32,
    cursor: Option<ChainCursor<'a>>,
    failed: bool,
}

impl<'a> Entries<'a> {
    fn fail<T>(&mut self, e: crate::ChainError) -> Option<Result<T>> {
        self.failed = true;
        Some(Err(e))
    }
}

impl<'a> Iterator for Entries<'a> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Some(cursor) = self.cursor.as_mut() {
                match cursor.next() {
                    Some(Ok((pos, record))) => {
                        if record.is_tombstone() {
                            continue;
                        }
                        return match self.chain.read_value(pos) {
                            Ok(value) => Some(Ok((record.key.to_vec(), value))),
                            Err(e) => self.fail(e),
                        };
                    }
                    Some(Err(e)) => return self.fail(e),
                    None => self.cursor = None,
                }
            }

            if self.bucket >= self.chain.layout.hash_table_size() {
                return None;
            }

            match self.chain.records(self.bucket) {
                Ok(cursor) => self.cursor = Some(cursor),
                Err(e) => return self.fail(e),
            }
            self.bucket += 1;
        }
    }
}
