// src/data/mod.rs

//! The `data` modules. Data representations of the stats-log domain:
//! timestamps, protocol code tables, connection and operation state, and
//! LDIF entries.

pub mod codes;
pub mod conn;
pub mod datetime;
pub mod ldif;
