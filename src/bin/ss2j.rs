// src/bin/ss2j.rs

//! Driver program _ss2j_ drives the [_ss2jlib_].
//!
//! Processes user-passed command-line arguments, then processes the passed
//! stats-log paths in order (or standard input), feeding every line through
//! one [`StatsProcessor`] so connection state and line numbering carry
//! across files. Reconstructed operation records are printed to STDOUT as
//! newline-delimited JSON, in input order. Line-level parse problems are
//! diagnostics on STDERR and never affect the exit value; only a failure to
//! open or read an input source does.
//!
//! [_ss2jlib_]: ss2jlib
//! [`StatsProcessor`]: ss2jlib::readers::statsprocessor::StatsProcessor

#![allow(non_camel_case_types)]

use std::io::{BufReader, Write};
use std::process::ExitCode;

use ::chrono::{FixedOffset, Local};
use ::clap::Parser;
use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::regex::Regex;
use ::ss2jlib::common::{File, FPath, EXIT_ERR};
use ::ss2jlib::debug::printers::e_err;
use ::ss2jlib::readers::statsprocessor::StatsProcessor;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

lazy_static! {
    /// the local system timezone offset, the `--tz-offset` default
    static ref LOCAL_OFFSET: FixedOffset = *Local::now().offset();

    static ref TZ_OFFSET_REGEX: Regex = Regex::new(
        r"^(?P<sign>[+-])(?P<hours>\d{2}):?(?P<minutes>\d{2})?$"
    ).unwrap();
}

/// clap `value_parser` for CLI option `--tz-offset`; accepts `+09:00`,
/// `+0900`, `-08`, etc.
fn cli_process_tz_offset(val: &str) -> Result<FixedOffset, String> {
    let captures = match TZ_OFFSET_REGEX.captures(val) {
        Some(captures) => captures,
        None => return Err(format!("unable to parse timezone offset {:?}", val)),
    };
    let hours: i32 = captures["hours"]
        .parse::<i32>()
        .map_err(|err| err.to_string())?;
    let minutes: i32 = match captures.name("minutes") {
        Some(match_) => match_
            .as_str()
            .parse::<i32>()
            .map_err(|err| err.to_string())?,
        None => 0,
    };
    let mut seconds: i32 = hours * 3600 + minutes * 60;
    if &captures["sign"] == "-" {
        seconds = -seconds;
    }
    match FixedOffset::east_opt(seconds) {
        Some(offset) => Ok(offset),
        None => Err(format!("timezone offset out of range {:?}", val)),
    }
}

#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "ss2j",
    // write expanded information for the `--version` output
    version = concatcp!(
        "(slapd stats to JSON)\n",
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"),
    ),
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path(s) of slapd stats log files, processed in order as one stream.
    /// With no PATHS, or for the path "-", the log is read from STDIN.
    #[clap(verbatim_doc_comment)]
    paths: Vec<FPath>,

    /// Fallback timezone offset for legacy year-less timestamps,
    /// e.g. "+09:00", "+0900", "-08". ISO-8601 timestamps carry their own
    /// offset per line and ignore this.
    /// If not passed then the local system timezone offset is used.
    #[clap(
        short = 't',
        long,
        verbatim_doc_comment,
        value_parser = cli_process_tz_offset,
        default_value_t = *LOCAL_OFFSET,
    )]
    tz_offset: FixedOffset,

    /// Print processing counts to STDERR at exit.
    #[clap(short = 's', long)]
    summary: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// main
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn main() -> ExitCode {
    let cli_args: CLI_Args = CLI_Args::parse();

    let stdout = std::io::stdout();
    let mut processor: StatsProcessor<_> = StatsProcessor::new(cli_args.tz_offset, stdout.lock());

    let mut paths: Vec<FPath> = cli_args.paths.clone();
    if paths.is_empty() {
        paths.push(FPath::from("-"));
    }
    for path in paths.iter() {
        let result = if path == "-" {
            processor.process(std::io::stdin().lock())
        } else {
            let file: File = match File::open(path) {
                Ok(file) => file,
                Err(err) => {
                    e_err!("unable to open {:?}: {}", path, err);
                    return ExitCode::from(EXIT_ERR as u8);
                }
            };
            processor.process(BufReader::new(file))
        };
        if let Err(err) = result {
            e_err!("processing {:?}: {}", path, err);
            return ExitCode::from(EXIT_ERR as u8);
        }
    }

    if cli_args.summary {
        eprintln!("{}", processor.summary);
        eprintln!("Connections still open: {}", processor.conns_open());
        eprintln!("Operations still open : {}", processor.ops_open());
        if let Some(year) = processor.year_inferred() {
            eprintln!("Year inferred         : {}", year);
        }
    }

    // records were written through the locked handle owned by the
    // processor; drop it to flush before exiting
    drop(processor);
    let _ = std::io::stdout().flush();

    ExitCode::SUCCESS
}
