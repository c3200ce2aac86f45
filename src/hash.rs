//! Bucket hashing
//!
//! djb2 over exactly `K` key bytes, 64-bit wrapping arithmetic, no seed and no
//! finalisation. The bucket of a key decides where its record is chained, so
//! these values are part of the file format.

/// djb2: `h = h * 33 + byte`, starting from 5381
pub fn djb2(key: &[u8]) -> u64 {
    key.iter().fold(5381u64, |hash, &byte| {
        (hash << 5).wrapping_add(hash).wrapping_add(byte as u64)
    })
}

/// Directory slot index for `key` in a table of `hash_table_size` buckets
///
/// `hash_table_size` must be non-zero; a validated [`Header`](crate::storage::Header)
/// always is.
pub fn bucket_for(key: &[u8], hash_table_size: u32) -> u32 {
    debug_assert!(hash_table_size > 0, "hash_table_size must be non-zero");
    (djb2(key) % hash_table_size as u64) as u32
}
