// Error types for harbormaster
// One enum for the whole library - the binary wraps it in anyhow

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Station state the engine can't be configured for (e.g. AutoDJ on a remote frontend).
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Anything that went wrong talking to the engine's control socket.
    #[error("Telnet failure: {message} ({})", code_label(.code, .kind))]
    Connection {
        code: Option<i32>,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("playlist repository error: {0}")]
    Repository(String),

    #[error("could not parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn connection(source: &io::Error) -> Self {
        Error::Connection {
            code: source.raw_os_error(),
            kind: source.kind(),
            message: source.to_string(),
        }
    }

    pub(crate) fn timed_out(what: &str) -> Self {
        Error::Connection {
            code: None,
            kind: io::ErrorKind::TimedOut,
            message: format!("{} timed out", what),
        }
    }

    /// True for failures the caller can't fix by retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// OS error number when there is one, the error kind otherwise.
fn code_label(code: &Option<i32>, kind: &io::ErrorKind) -> String {
    match code {
        Some(code) => code.to_string(),
        None => format!("{:?}", kind),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
