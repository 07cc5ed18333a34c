#![forbid(unsafe_code)]

//! Command-line argument parsing for the harness.
//!
//! Parsed by hand. `FGUARD_*` environment variables supply defaults that
//! explicit flags override.

use std::path::PathBuf;

use fguard_core::FieldKind;
use time::Date;

use crate::error::HarnessError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
FormGuard harness: check field values and replay form event scripts

USAGE:
    fguard-harness [OPTIONS] <COMMAND>

COMMANDS:
    check <KIND> <VALUE>   Validate one value (kinds: name, username, email,
                           mobile, password, confirmPassword, address, postal,
                           securityAnswer, dateOfBirth, required)
    dob <YYYY-MM-DD>       Assess a date of birth for the consent flow
    replay <FILE>          Run a JSON-lines event script through the form

OPTIONS:
    --config=FILE          Engine configuration (JSON, partial allowed)
    --today=YYYY-MM-DD     Evaluate ages as of this date (default: today)
    --password=VALUE       Password to compare against for confirmPassword
    --log-json             Emit logs as JSON lines on stderr
    --help, -h             Show this help message
    --version, -V          Show version

ENVIRONMENT VARIABLES:
    FGUARD_LOG             Log filter directives (default: warn)
    FGUARD_CONFIG          Default for --config
    FGUARD_TODAY           Default for --today";

/// What to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check { kind: FieldKind, value: String },
    Dob { value: String },
    Replay { path: PathBuf },
    Help,
    Version,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub today: Option<Date>,
    pub password: Option<String>,
    pub log_json: bool,
}

impl Opts {
    /// Parse process arguments and environment.
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::parse(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Parse `args` (without the program name), reading defaults through
    /// `env`.
    pub fn parse<I, E>(args: I, env: E) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut config = env("FGUARD_CONFIG").map(PathBuf::from);
        let mut today = env("FGUARD_TODAY").map(|v| parse_date(&v)).transpose()?;
        let mut password = None;
        let mut log_json = false;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Self::bare(Command::Help)),
                "--version" | "-V" => return Ok(Self::bare(Command::Version)),
                "--log-json" => log_json = true,
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--today" => today = Some(parse_date(&next_value(&mut args, "--today")?)?),
                "--password" => password = Some(next_value(&mut args, "--password")?),
                other => {
                    if let Some(val) = other.strip_prefix("--config=") {
                        config = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--today=") {
                        today = Some(parse_date(val)?);
                    } else if let Some(val) = other.strip_prefix("--password=") {
                        password = Some(val.to_string());
                    } else if other.starts_with("--") {
                        return Err(HarnessError::Usage(format!("unknown option: {other}")));
                    } else {
                        positional.push(arg);
                    }
                }
            }
        }

        Ok(Self {
            command: parse_command(positional)?,
            config,
            today,
            password,
            log_json,
        })
    }

    fn bare(command: Command) -> Self {
        Self {
            command,
            config: None,
            today: None,
            password: None,
            log_json: false,
        }
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command, HarnessError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Err(HarnessError::Usage("missing command".to_string()));
    };
    let rest: Vec<String> = words.collect();
    match (name.as_str(), rest.as_slice()) {
        ("check", [kind, value]) => Ok(Command::Check {
            kind: kind
                .parse()
                .map_err(|e| HarnessError::Usage(format!("{e}")))?,
            value: value.clone(),
        }),
        ("dob", [value]) => Ok(Command::Dob {
            value: value.clone(),
        }),
        ("replay", [path]) => Ok(Command::Replay {
            path: PathBuf::from(path),
        }),
        ("check" | "dob" | "replay", _) => Err(HarnessError::Usage(format!(
            "wrong number of arguments for {name}"
        ))),
        (other, _) => Err(HarnessError::Usage(format!("unknown command: {other}"))),
    }
}

fn next_value(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
) -> Result<String, HarnessError> {
    args.next()
        .ok_or_else(|| HarnessError::Usage(format!("{flag} needs a value")))
}

fn parse_date(value: &str) -> Result<Date, HarnessError> {
    fguard_core::age::parse_dob(value.trim())
        .map_err(|_| HarnessError::Usage(format!("invalid date: {value}")))
}
