//! Configuration for ChainDB
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Header;

/// Main configuration for opening a ChainDB file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single database file
    pub path: PathBuf,

    /// How the file is opened (and whether it may be created or replaced)
    pub mode: OpenMode,

    // -------------------------------------------------------------------------
    // Layout Configuration (only used when the file is created)
    // -------------------------------------------------------------------------
    /// Number of bucket directory slots (`H`)
    pub hash_table_size: u32,

    /// Key size in bytes (`K`)
    pub key_size: u32,

    /// Value size in bytes (`V`)
    pub value_size: u32,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: whether to fdatasync after each mutation
    pub sync_strategy: SyncStrategy,
}

/// How the database file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    /// Read only; the file must exist
    ReadOnly,

    /// Read/write; the file must exist
    ReadWrite,

    /// Read/write; create the file if it does not exist
    ReadWriteCreate,

    /// Read/write; truncate and recreate the file unconditionally
    ReadWriteReplace,
}

impl OpenMode {
    /// Whether put/delete are permitted
    pub fn is_writable(self) -> bool {
        !matches!(self, OpenMode::ReadOnly)
    }
}

/// Sync strategy for mutating writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStrategy {
    /// Writes go straight to the OS buffer cache (no user-space buffering)
    OsBuffer,

    /// fdatasync after every put/delete (safest, slowest)
    EveryWrite,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./chaindb.db"),
            mode: OpenMode::ReadWriteCreate,
            hash_table_size: 1024,
            key_size: 8,
            value_size: 64,
            sync_strategy: SyncStrategy::OsBuffer,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Header this config would write when creating a new file
    pub fn header(&self) -> Result<Header> {
        Header::new(self.hash_table_size, self.key_size, self.value_size)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the open mode
    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the number of bucket directory slots
    pub fn hash_table_size(mut self, slots: u32) -> Self {
        self.config.hash_table_size = slots;
        self
    }

    /// Set the key size (in bytes)
    pub fn key_size(mut self, size: u32) -> Self {
        self.config.key_size = size;
        self
    }

    /// Set the value size (in bytes)
    pub fn value_size(mut self, size: u32) -> Self {
        self.config.value_size = size;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
