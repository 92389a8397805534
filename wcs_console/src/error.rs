//! Console error taxonomy.

use crate::command::ParseError;
use std::io;
use thiserror::Error;
use wcs_common::config::ConfigError;
use wcs_common::hal::backend::BackendError;

/// Errors raised by the console.
///
/// `InvalidAxis`, `MalformedCommand` and per-cycle `BackendUnavailable` are
/// reported to the operator and the loop continues. Everything else ends the
/// session.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Axis token outside x/y/z.
    #[error("invalid axis '{0}' (use x, y or z)")]
    InvalidAxis(String),

    /// Line outside the command grammar: wrong arity, not a number,
    /// unknown word or undecodable text.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// Backend call failed or timed out. Fatal only at startup.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendError),

    /// Operator pressed Ctrl+C.
    #[error("cancelled by operator")]
    OperatorCancel,

    /// Reading operator input or writing output failed.
    #[error("operator I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ParseError> for ConsoleError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::InvalidAxis(invalid) => ConsoleError::InvalidAxis(invalid.0),
            other => ConsoleError::MalformedCommand(other.to_string()),
        }
    }
}

impl ConsoleError {
    /// The error ends the session rather than a single cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConsoleError::OperatorCancel | ConsoleError::Io(_) | ConsoleError::Config(_)
        )
    }
}
