//! Tests for the storage layer codecs and the bucket hash

mod header_tests;
mod offset_tests;
