//! Tests for the public engine surface

mod rebuild_tests;
