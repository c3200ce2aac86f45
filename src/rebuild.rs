//! Offline rebuild
//!
//! The hash table size is fixed when a file is created. To change it, every
//! live entry is copied into a brand new file; the source is only read.
//! Tombstones are not carried over, so the rebuilt file is also compact.

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::config::{Config, OpenMode, SyncStrategy};
use crate::engine::{Engine, Stats};
use crate::error::{ChainError, Result};

/// Copy the live entries of `src` into a new file at `dst` with
/// `hash_table_size` buckets
///
/// `dst` is created, or replaced if it exists. Returns the stats of the new
/// file.
pub fn rebuild(src: impl AsRef<Path>, dst: impl AsRef<Path>, hash_table_size: u32) -> Result<Stats> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if same_file(src, dst)? {
        return Err(ChainError::InvalidParameters(format!(
            "rebuild destination {} is the source file {}",
            dst.display(),
            src.display()
        )));
    }

    let source = Engine::open_path(src, OpenMode::ReadOnly, 0, 0, 0)?;

    let config = Config::builder()
        .path(dst)
        .mode(OpenMode::ReadWriteReplace)
        .hash_table_size(hash_table_size)
        .key_size(source.key_size())
        .value_size(source.value_size())
        .sync_strategy(SyncStrategy::OsBuffer)
        .build();
    let mut target = Engine::open(config)?;

    let mut copied = 0u64;
    for entry in source.iter() {
        let (key, value) = entry?;
        target.put(&key, &value)?;
        copied += 1;
    }

    target.sync()?;
    let stats = target.stats()?;

    info!(
        src = %src.display(),
        dst = %dst.display(),
        copied,
        old_buckets = source.hash_table_size(),
        new_buckets = hash_table_size,
        "rebuilt database"
    );

    target.close()?;
    source.close()?;
    Ok(stats)
}

/// Whether `dst` names the file at `src`, through `..`, symlinks or hard links
///
/// A destination that does not exist yet cannot be the source.
fn same_file(src: &Path, dst: &Path) -> Result<bool> {
    let src_meta = fs::metadata(src)?;
    let dst_meta = match fs::metadata(dst) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        Ok(src_meta.dev() == dst_meta.dev() && src_meta.ino() == dst_meta.ino())
    }

    #[cfg(not(unix))]
    {
        let _ = (src_meta, dst_meta);
        Ok(fs::canonicalize(src)? == fs::canonicalize(dst)?)
    }
}
