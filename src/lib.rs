//! # ChainDB
//!
//! An embedded, single-file, fixed-record key-value store:
//! - Key and value sizes fixed when the file is created
//! - On-disk hash table with chained buckets, O(1) expected lookups
//! - Append-and-relink inserts, in-place updates, tombstone deletes
//! - First-fit reuse of tombstoned records within a bucket's chain
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Engine / SharedEngine                       │
//! │            (open modes, size checks, sync policy)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Chain Engine                             │
//! │        (hash → bucket → walk → append / relink / reuse)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────┐
//!          │            │             │
//!          ▼            ▼             ▼
//!   ┌───────────┐ ┌───────────┐ ┌───────────┐
//!   │  Header   │ │  Bucket   │ │  Record   │
//!   │  Codec    │ │ Directory │ │  Codec    │
//!   └─────┬─────┘ └─────┬─────┘ └─────┬─────┘
//!         └─────────────┼─────────────┘
//!                       ▼
//!               ┌───────────────┐
//!               │ DbFile (pread │
//!               │   / pwrite)   │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use chaindb::{Engine, OpenMode};
//!
//! let mut db = Engine::open_path("data.db", OpenMode::ReadWriteCreate, 1024, 8, 64)?;
//! db.put(&1u64.to_be_bytes(), &[7u8; 64])?;
//! assert_eq!(db.get(&1u64.to_be_bytes())?, Some(vec![7u8; 64]));
//! db.close()?;
//! # Ok::<(), chaindb::ChainError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod hash;
pub mod storage;
pub mod chain;
pub mod engine;
pub mod shared;
pub mod rebuild;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ChainError, Result};
pub use config::{Config, OpenMode, SyncStrategy};
pub use engine::{Engine, Stats};
pub use shared::SharedEngine;
pub use rebuild::rebuild;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ChainDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
