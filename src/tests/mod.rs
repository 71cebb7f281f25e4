// src/tests/mod.rs

//! Tests for _ss2jlib_.
//!
//! Tests are placed at `src/tests/`, inside the `ss2jlib`. Tests placed at
//! top-level path `tests/` do not have crate-internal visibility, which
//! these tests need.

pub mod common;
pub mod codes_tests;
pub mod conn_tests;
pub mod datetime_tests;
pub mod statslinereader_tests;
