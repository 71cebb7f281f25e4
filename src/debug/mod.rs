// src/debug/mod.rs

//! Macros and helpers for printing diagnostics.

pub mod printers;
