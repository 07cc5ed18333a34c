#![forbid(unsafe_code)]

use std::fmt;
use std::io;
use std::path::PathBuf;

use fguard_core::ConfigError;

/// Errors that stop the harness.
#[derive(Debug)]
pub enum HarnessError {
    /// Bad command line.
    Usage(String),
    /// Engine configuration could not be loaded.
    Config(ConfigError),
    /// A script or output stream failed.
    Io { path: Option<PathBuf>, source: io::Error },
    /// A replay line was not a valid step.
    Script {
        line: usize,
        source: serde_json::Error,
    },
    /// Output could not be serialised.
    Json(serde_json::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::Usage(msg) => write!(f, "usage error: {msg} (try --help)"),
            HarnessError::Config(e) => write!(f, "config error: {e}"),
            HarnessError::Io {
                path: Some(path),
                source,
            } => write!(f, "I/O error on {}: {source}", path.display()),
            HarnessError::Io { path: None, source } => write!(f, "I/O error: {source}"),
            HarnessError::Script { line, source } => {
                write!(f, "invalid step on line {line}: {source}")
            }
            HarnessError::Json(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for HarnessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HarnessError::Usage(_) => None,
            HarnessError::Config(e) => Some(e),
            HarnessError::Io { source, .. } => Some(source),
            HarnessError::Script { source, .. } => Some(source),
            HarnessError::Json(e) => Some(e),
        }
    }
}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        HarnessError::Config(e)
    }
}

impl From<io::Error> for HarnessError {
    fn from(source: io::Error) -> Self {
        HarnessError::Io { path: None, source }
    }
}

impl From<serde_json::Error> for HarnessError {
    fn from(e: serde_json::Error) -> Self {
        HarnessError::Json(e)
    }
}
