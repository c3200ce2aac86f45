//! Shared Engine
//!
//! Thread-safe wrapper that enforces the single-writer discipline.
//!
//! ## Concurrency:
//! - `get`/`contains`/`stats`: read lock (many concurrent readers)
//! - `put`/`delete`: write lock (exclusive, serialized)
//! - All methods use `&self`, so the wrapper can live in an `Arc`

use parking_lot::RwLock;

use crate::engine::{Engine, Stats};
use crate::error::Result;

/// An [`Engine`] that can be shared between threads
pub struct SharedEngine {
    inner: RwLock<Engine>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: RwLock::new(engine),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.read().get(key)
    }

    /// Whether a live record holds the key (read lock)
    pub fn contains(&self, key: &[u8]) -> Result<bool> {
        self.inner.read().contains(key)
    }

    /// Put a key-value pair (write lock)
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.inner.write().put(key, value)
    }

    /// Delete a key (write lock)
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.inner.write().delete(key)
    }

    /// Occupancy summary (read lock)
    pub fn stats(&self) -> Result<Stats> {
        self.inner.read().stats()
    }

    /// Run `f` with shared access to the engine, e.g. to iterate
    pub fn with_engine<T>(&self, f: impl FnOnce(&Engine) -> T) -> T {
        let engine = self.inner.read();
        f(&*engine)
    }

    /// Take the engine back out
    pub fn into_inner(self) -> Engine {
        self.inner.into_inner()
    }

    /// Close the underlying engine
    pub fn close(self) -> Result<()> {
        self.into_inner().close()
    }
}

impl From<Engine> for SharedEngine {
    fn from(engine: Engine) -> Self {
        Self::new(engine)
    }
}
