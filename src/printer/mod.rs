// src/printer/mod.rs

//! The `printer` modules. Writing records and reports.

pub mod printers;
