// src/bin/ldifdiff.rs

//! Driver program _ldifdiff_: compare two LDIF files and emit a change
//! script.
//!
//! Entries only in FILE1 become delete blocks (longest DN first), entries
//! only in FILE2 become add blocks (shortest DN first), and entries in both
//! whose decoded forms differ become per-attribute modify blocks, printed
//! last. Base64-encoded attribute values are decoded for comparison only.
//!
//! Ported from `ldif-diff` implemented in Perl.

#![allow(non_camel_case_types)]

use std::io::BufReader;
use std::process::ExitCode;

use ::anyhow::{Context, Result};
use ::clap::Parser;
use ::ss2jlib::common::{File, FPath, EXIT_ERR};
use ::ss2jlib::data::ldif::ldif_diff;
use ::ss2jlib::debug::printers::e_err;
use ::ss2jlib::readers::ldifreader::{AttrFilter, LdifReader};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Parser, Debug)]
#[clap(
    about = "Compare two LDIF files and emit a change script",
    name = "ldifdiff",
    version,
)]
struct CLI_Args {
    /// LDIF file 1 (the "old" side)
    #[clap(value_name = "FILE1")]
    file1: FPath,

    /// LDIF file 2 (the "new" side)
    #[clap(value_name = "FILE2")]
    file2: FPath,

    /// Attribute name(s) to compare; with any given, only these attributes
    /// are compared
    #[clap(value_name = "ATTRIBUTE")]
    target_attrs: Vec<String>,

    /// Comma-separated attribute name(s) to include despite the default
    /// operational-attribute exclusions
    #[clap(short = 'i', long, value_name = "NAME")]
    include_attrs: Option<String>,

    /// Comma-separated attribute name(s) to exclude from comparison
    #[clap(short = 'e', long, value_name = "NAME")]
    exclude_attrs: Option<String>,
}

fn run(cli_args: &CLI_Args) -> Result<()> {
    let mut filter: AttrFilter = AttrFilter::new();
    filter.target = cli_args.target_attrs.clone();
    if let Some(include_attrs) = &cli_args.include_attrs {
        filter
            .include
            .extend(include_attrs.split(',').map(String::from));
    }
    if let Some(exclude_attrs) = &cli_args.exclude_attrs {
        filter
            .exclude
            .extend(exclude_attrs.split(',').map(String::from));
    }

    let file1: File = File::open(&cli_args.file1)
        .with_context(|| format!("unable to open {:?}", cli_args.file1))?;
    let file2: File = File::open(&cli_args.file2)
        .with_context(|| format!("unable to open {:?}", cli_args.file2))?;
    let old_reader = LdifReader::new(BufReader::new(file1), filter.clone());
    let new_reader = LdifReader::new(BufReader::new(file2), filter);

    let stdout = std::io::stdout();
    ldif_diff(old_reader, new_reader, &mut stdout.lock())?;

    Ok(())
}

pub fn main() -> ExitCode {
    let cli_args: CLI_Args = CLI_Args::parse();
    match run(&cli_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            e_err!("{:#}", err);
            ExitCode::from(EXIT_ERR as u8)
        }
    }
}
