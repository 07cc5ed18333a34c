#![forbid(unsafe_code)]

//! FormGuard command-line harness.
//!
//! ```text
//! fguard-harness check email jane@example.org
//! fguard-harness --today=2026-10-18 dob 2011-06-15
//! fguard-harness replay signup.jsonl
//! ```
//!
//! Every command prints one JSON document on stdout.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod replay;

use std::fs::File;
use std::io::{BufReader, Write};

use fguard_core::{EngineConfig, FieldValidatorRegistry};
use fguard_runtime::{Clock, SystemClock};
use time::PrimitiveDateTime;
use time::macros::time;

use crate::cli::{Command, HELP_TEXT, Opts, VERSION};

pub use crate::error::HarnessError;

/// Exit status for a value that failed `check`.
pub const EXIT_INVALID: i32 = 1;
/// Exit status for usage, config, and I/O errors.
pub const EXIT_ERROR: i32 = 2;

/// Run `opts`, writing output to `out`. Returns the process exit status.
pub fn run(opts: &Opts, out: &mut dyn Write) -> Result<i32, HarnessError> {
    match &opts.command {
        Command::Help => {
            writeln!(out, "{HELP_TEXT}")?;
            return Ok(0);
        }
        Command::Version => {
            writeln!(out, "fguard-harness {VERSION}")?;
            return Ok(0);
        }
        _ => {}
    }

    let config = match &opts.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let registry = FieldValidatorRegistry::new(&config);
    let wall = wall_clock(opts);

    let status = match &opts.command {
        Command::Check { kind, value } => {
            let report = commands::check(&registry, *kind, value, opts.password.as_deref(), wall);
            write_json(out, &report)?;
            if report.valid { 0 } else { EXIT_INVALID }
        }
        Command::Dob { value } => {
            let report = commands::dob(&registry, value, wall);
            write_json(out, &report)?;
            if report.valid { 0 } else { EXIT_INVALID }
        }
        Command::Replay { path } => {
            let file = File::open(path).map_err(|source| HarnessError::Io {
                path: Some(path.clone()),
                source,
            })?;
            let steps = replay::parse_script(BufReader::new(file))?;
            let summary = replay::run(&steps, registry, wall);
            write_json(out, &summary)?;
            0
        }
        Command::Help | Command::Version => 0,
    };
    Ok(status)
}

/// Noon on `--today`, or the system clock.
fn wall_clock(opts: &Opts) -> PrimitiveDateTime {
    match opts.today {
        Some(date) => PrimitiveDateTime::new(date, time!(12:00)),
        None => SystemClock.now().wall,
    }
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> Result<(), HarnessError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
