// src/bin/db_size.rs

//! Driver program _db-size_: report the data size in Berkeley DB files.
//!
//! Shells out to the external statistics utility (`slapd_db_stat`) per
//! named database file, parses its text report, and prints size/used/free
//! figures in bytes and MiB per file plus a total.

#![allow(non_camel_case_types)]

use std::process::ExitCode;

use ::clap::Parser;
use ::ss2jlib::common::{FPath, EXIT_ERR};
use ::ss2jlib::debug::printers::e_err;
use ::ss2jlib::readers::dbstatreader::{
    db_sizes,
    format_sizes,
    DbSizes,
    DB_STAT_ENV,
    DB_STAT_PATH_DEFAULT,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Parser, Debug)]
#[clap(
    about = "Report data size in Berkeley DB files",
    name = "db-size",
    version,
)]
struct CLI_Args {
    /// Database file(s) to report, e.g. *.bdb
    #[clap(required = true, value_name = "DBFILE")]
    db_files: Vec<FPath>,
}

pub fn main() -> ExitCode {
    let cli_args: CLI_Args = CLI_Args::parse();
    let db_stat_path: FPath = std::env::var(DB_STAT_ENV)
        .unwrap_or_else(|_| FPath::from(DB_STAT_PATH_DEFAULT));

    let mut total: DbSizes = DbSizes::default();
    for db_file in cli_args.db_files.iter() {
        let sizes: DbSizes = match db_sizes(&db_stat_path, db_file) {
            Ok(sizes) => sizes,
            Err(err) => {
                e_err!("{}", err);
                return ExitCode::from(EXIT_ERR as u8);
            }
        };
        total.size += sizes.size;
        total.free += sizes.free;
        print!("{}", format_sizes(db_file, &sizes));
    }
    print!("{}", format_sizes("Total", &total));

    ExitCode::SUCCESS
}
