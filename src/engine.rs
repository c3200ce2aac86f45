//! Engine Module
//!
//! The public handle over one database file.
//!
//! ## Responsibilities
//! - Open, create or replace the file according to [`OpenMode`]
//! - Validate the header and adopt its sizes (the file is authoritative)
//! - Check key/value lengths before any I/O
//! - Route get/put/delete to the chain engine and apply the sync strategy

use std::fs::OpenOptions;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::chain::{Chain, Entries, Probe};
use crate::config::{Config, OpenMode, SyncStrategy};
use crate::error::{ChainError, Result};
use crate::storage::{BucketDirectory, DbFile, FilePos, Header, Layout, HEADER_SIZE};

/// An open database file
///
/// ## Concurrency Model: Single Writer
///
/// The engine performs no locking of its own.
///
/// - **Writes** (put/delete): take `&mut self`, so the borrow checker
///   guarantees a single writer per handle. Two writable handles opened on the
///   same path (even within one process) are not coordinated and can race on a
///   chain's append-then-relink sequence
/// - **Reads** (get/iter/stats): take `&self` and use positioned reads only, so
///   they never disturb each other
/// - Threads that need to share a handle go through
///   [`SharedEngine`](crate::SharedEngine)
/// - Two processes writing the same file are not supported: the
///   "append, then relink" sequence of a put can lose updates
///
/// The file handle is released when the engine is closed or dropped.
#[derive(Debug)]
pub struct Engine {
    /// Configuration the engine was opened with
    config: Config,

    /// The database file (positioned I/O only)
    file: DbFile,

    /// Geometry decoded from the header
    layout: Layout,
}

/// Occupancy summary of a database file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of bucket directory slots
    pub buckets: u32,

    /// Buckets with at least one record
    pub used_buckets: u32,

    /// Active records reachable from the directory
    pub live_records: u64,

    /// Tombstoned records reachable from the directory
    pub tombstones: u64,

    /// Most records in any single chain
    pub longest_chain: u64,

    /// File length in bytes
    pub file_len: u64,
}

impl Engine {
    /// Open a database file with the given config
    ///
    /// On startup:
    /// 1. Open the file according to the mode
    /// 2. If the file is empty, write a header and an empty directory
    /// 3. Otherwise decode the header; its sizes override the config
    pub fn open(config: Config) -> Result<Self> {
        // Never truncate an existing file for a config that cannot be written
        if config.mode == OpenMode::ReadWriteReplace {
            config.header()?;
        }

        let mut options = OpenOptions::new();
        options.read(true);
        match config.mode {
            OpenMode::ReadOnly => {}
            OpenMode::ReadWrite => {
                options.write(true);
            }
            OpenMode::ReadWriteCreate => {
                options.write(true).create(true);
            }
            OpenMode::ReadWriteReplace => {
                options.write(true).create(true).truncate(true);
            }
        }

        let file = DbFile::new(options.open(&config.path)?);
        let len = file.len()?;

        let layout = if len == 0 {
            if !config.mode.is_writable() {
                return Err(ChainError::CorruptFile(format!(
                    "{} is empty",
                    config.path.display()
                )));
            }
            let layout = Self::initialize(&file, config.header()?)?;
            debug!(
                path = %config.path.display(),
                hash_table_size = layout.hash_table_size(),
                key_size = layout.key_size(),
                value_size = layout.value_size(),
                "created database"
            );
            layout
        } else {
            let layout = Self::read_layout(&file, len).map_err(|e| {
                warn!(path = %config.path.display(), error = %e, "rejected database file");
                e
            })?;
            debug!(
                path = %config.path.display(),
                mode = ?config.mode,
                hash_table_size = layout.hash_table_size(),
                key_size = layout.key_size(),
                value_size = layout.value_size(),
                file_len = len,
                "opened database"
            );
            layout
        };

        // The header wins over whatever sizes the caller passed
        let config = Config {
            hash_table_size: layout.hash_table_size(),
            key_size: layout.key_size(),
            value_size: layout.value_size(),
            ..config
        };

        Ok(Self {
            config,
            file,
            layout,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// The sizes are only used if the file is created.
    pub fn open_path(
        path: impl AsRef<Path>,
        mode: OpenMode,
        hash_table_size: u32,
        key_size: u32,
        value_size: u32,
    ) -> Result<Self> {
        let config = Config::builder()
            .path(path.as_ref())
            .mode(mode)
            .hash_table_size(hash_table_size)
            .key_size(key_size)
            .value_size(value_size)
            .build();
        Self::open(config)
    }

    /// Write header and `H` empty directory slots into an empty file
    fn initialize(file: &DbFile, header: Header) -> Result<Layout> {
        let layout = header.layout();
        file.write_all_at(&header.encode(), FilePos(0))?;
        BucketDirectory::new(file, &layout).initialize()?;
        file.sync()?;
        Ok(layout)
    }

    /// Decode the header of an existing file and check the directory is complete
    fn read_layout(file: &DbFile, len: u64) -> Result<Layout> {
        if len < HEADER_SIZE {
            return Err(ChainError::CorruptFile(format!(
                "file is {} bytes, shorter than the {}-byte header",
                len, HEADER_SIZE
            )));
        }

        let mut raw = [0u8; HEADER_SIZE as usize];
        file.read_exact_at(&mut raw, FilePos(0))?;
        let layout = Header::decode(&raw)?.layout();

        if len < layout.min_file_len() {
            return Err(ChainError::CorruptFile(format!(
                "file is {} bytes, bucket directory needs {}",
                len,
                layout.min_file_len()
            )));
        }

        Ok(layout)
    }

    fn chain(&self) -> Chain<'_> {
        Chain::new(&self.file, &self.layout)
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.layout.key_size() as usize {
            return Err(ChainError::KeySize {
                expected: self.layout.key_size(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    fn check_value(&self, value: &[u8]) -> Result<()> {
        if value.len() != self.layout.value_size() as usize {
            return Err(ChainError::ValueSize {
                expected: self.layout.value_size(),
                actual: value.len(),
            });
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<()> {
        if !self.config.mode.is_writable() {
            return Err(ChainError::ReadOnly);
        }
        Ok(())
    }

    fn after_write(&self) -> Result<()> {
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync()?;
        }
        Ok(())
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Get a value by key
    ///
    /// Returns `Ok(None)` if no live record holds the key.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_key(key)?;
        self.chain().get(key)
    }

    /// Whether a live record holds the key
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        self.check_key(key)?;
        Ok(matches!(self.chain().probe(key)?, Probe::Found { .. }))
    }

    /// Put a key-value pair (insert or update)
    ///
    /// Updating an existing key, or reusing a tombstoned record of the same
    /// bucket, does not grow the file.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.check_key(key)?;
        self.check_value(value)?;

        let outcome = self.chain().put(key, value)?;
        trace!(?outcome, "put");
        self.after_write()
    }

    /// Delete a key
    ///
    /// Deleting a key that is not present succeeds and changes nothing.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.check_key(key)?;

        if self.chain().delete(key)? {
            self.after_write()?;
        }
        Ok(())
    }

    /// Iterate all live entries in bucket order, then chain order
    pub fn iter(&self) -> Entries<'_> {
        self.chain().entries()
    }

    /// Walk every chain and summarise occupancy
    pub fn stats(&self) -> Result<Stats> {
        let chain = self.chain();
        let mut stats = Stats {
            buckets: self.layout.hash_table_size(),
            file_len: self.file.len()?,
            ..Stats::default()
        };

        for bucket in 0..self.layout.hash_table_size() {
            let mut length = 0u64;
            for record in chain.records(bucket)? {
                let (_, record) = record?;
                if record.is_tombstone() {
                    stats.tombstones += 1;
                } else {
                    stats.live_records += 1;
                }
                length += 1;
            }
            if length > 0 {
                stats.used_buckets += 1;
            }
            stats.longest_chain = stats.longest_chain.max(length);
        }

        Ok(stats)
    }

    /// Force file data to stable storage
    pub fn sync(&self) -> Result<()> {
        self.file.sync()?;
        Ok(())
    }

    /// Close the engine
    ///
    /// Syncs a writable file, then releases the handle.
    pub fn close(self) -> Result<()> {
        if self.config.mode.is_writable() {
            self.file.sync()?;
        }
        debug!(path = %self.config.path.display(), "closed database");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of bucket directory slots (from the file header)
    pub fn hash_table_size(&self) -> u32 {
        self.layout.hash_table_size()
    }

    /// Key size in bytes (from the file header)
    pub fn key_size(&self) -> u32 {
        self.layout.key_size()
    }

    /// Value size in bytes (from the file header)
    pub fn value_size(&self) -> u32 {
        self.layout.value_size()
    }

    pub fn mode(&self) -> OpenMode {
        self.config.mode
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Current file length in bytes
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.len()?)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
