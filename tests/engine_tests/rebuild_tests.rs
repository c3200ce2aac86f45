//! Tests for the offline rebuild

use chaindb::config::OpenMode;
use chaindb::engine::Engine;
use std::fs;
use std::path::Path;

use chaindb::{rebuild, ChainError};
use tempfile::TempDir;

fn key(i: u64) -> [u8; 8] {
    i.to_be_bytes()
}

#[test]
fn test_rebuild_copies_live_entries() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    let dst = temp.path().join("dst.db");

    let mut engine = Engine::open_path(&src, OpenMode::ReadWriteCreate, 1, 8, 8).unwrap();
    for i in 0..100u64 {
        engine.put(&key(i), &(i * 3).to_be_bytes()).unwrap();
    }
    for i in 0..10u64 {
        engine.delete(&key(i)).unwrap();
    }
    engine.close().unwrap();

    let stats = rebuild(&src, &dst, 64).unwrap();

    assert_eq!(stats.buckets, 64);
    assert_eq!(stats.live_records, 90);
    assert_eq!(stats.tombstones, 0);
    assert!(stats.longest_chain < 90);

    let rebuilt = Engine::open_path(&dst, OpenMode::ReadOnly, 0, 0, 0).unwrap();
    assert_eq!(rebuilt.hash_table_size(), 64);
    assert_eq!(rebuilt.key_size(), 8);
    assert_eq!(rebuilt.value_size(), 8);
    for i in 0..100u64 {
        let expected = if i < 10 { None } else { Some((i * 3).to_be_bytes().to_vec()) };
        assert_eq!(rebuilt.get(&key(i)).unwrap(), expected);
    }

    // Source untouched
    let source = Engine::open_path(&src, OpenMode::ReadOnly, 0, 0, 0).unwrap();
    assert_eq!(source.hash_table_size(), 1);
    assert_eq!(source.stats().unwrap().tombstones, 10);
}

#[test]
fn test_rebuild_rejects_same_path() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    Engine::open_path(&src, OpenMode::ReadWriteCreate, 4, 8, 8)
        .unwrap()
        .close()
        .unwrap();

    assert!(matches!(
        rebuild(&src, &src, 8),
        Err(ChainError::InvalidParameters(_))
    ));
}

fn fill(path: &Path, count: u64) {
    let mut engine = Engine::open_path(path, OpenMode::ReadWriteCreate, 4, 8, 8).unwrap();
    for i in 0..count {
        engine.put(&key(i), &i.to_be_bytes()).unwrap();
    }
    engine.close().unwrap();
}

fn assert_source_intact(path: &Path, count: u64) {
    let source = Engine::open_path(path, OpenMode::ReadOnly, 0, 0, 0).unwrap();
    assert_eq!(source.hash_table_size(), 4);
    assert_eq!(source.stats().unwrap().live_records, count);
    for i in 0..count {
        assert_eq!(source.get(&key(i)).unwrap(), Some(i.to_be_bytes().to_vec()));
    }
}

#[test]
fn test_rebuild_rejects_dotdot_alias_of_source() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    fs::create_dir(temp.path().join("sub")).unwrap();
    fill(&src, 10);

    let alias = temp.path().join("sub").join("..").join("src.db");
    assert!(matches!(
        rebuild(&src, &alias, 8),
        Err(ChainError::InvalidParameters(_))
    ));
    assert_source_intact(&src, 10);
}

#[test]
fn test_rebuild_rejects_hard_link_to_source() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    let link = temp.path().join("link.db");
    fill(&src, 10);
    fs::hard_link(&src, &link).unwrap();

    assert!(matches!(
        rebuild(&src, &link, 8),
        Err(ChainError::InvalidParameters(_))
    ));
    assert_source_intact(&src, 10);
}

#[cfg(unix)]
#[test]
fn test_rebuild_rejects_symlink_to_source() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    let link = temp.path().join("link.db");
    fill(&src, 10);
    std::os::unix::fs::symlink(&src, &link).unwrap();

    assert!(matches!(
        rebuild(&src, &link, 8),
        Err(ChainError::InvalidParameters(_))
    ));
    assert_source_intact(&src, 10);
}

#[test]
fn test_rebuild_replaces_unrelated_destination() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    let dst = temp.path().join("dst.db");
    fill(&src, 10);
    fs::write(&dst, b"stale").unwrap();

    let stats = rebuild(&src, &dst, 8).unwrap();
    assert_eq!(stats.live_records, 10);
    assert_source_intact(&src, 10);
}

#[test]
fn test_rebuild_rejects_zero_buckets() {
    let temp = TempDir::new().unwrap();
    let src = temp.path().join("src.db");
    let dst = temp.path().join("dst.db");
    Engine::open_path(&src, OpenMode::ReadWriteCreate, 4, 8, 8)
        .unwrap()
        .close()
        .unwrap();

    assert!(matches!(
        rebuild(&src, &dst, 0),
        Err(ChainError::InvalidParameters(_))
    ));
    assert!(!dst.exists());
}
