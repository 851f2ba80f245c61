//! Errors reported by CLI commands.

use thiserror::Error;

/// Failures specific to the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested internal stream does not exist.
    #[error("no internal stream named {0:?}")]
    StreamNotFound(String),

    /// The help file has no |SYSTEM stream.
    #[error("help file has no |SYSTEM stream")]
    NoSystemStream,

    /// An output format other than text or json.
    #[error("unknown output format {0:?} (expected text or json)")]
    UnknownFormat(String),
}
