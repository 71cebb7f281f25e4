// src/readers/mod.rs

//! The `readers` modules. Consume text streams and drive the data models:
//! the stats-log line tokenizer and processor, the LDIF entry reader, and
//! the `db_stat` report parser.

pub mod dbstatreader;
pub mod ldifreader;
pub mod statslinereader;
pub mod statsprocessor;
