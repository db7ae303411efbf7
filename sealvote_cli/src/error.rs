use std::path::PathBuf;
use thiserror::Error;

/// Everything that can make a command fail
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Ledger(#[from] sealvote::Error),

    #[error("{0}")]
    Query(#[from] sealvote::ValidationError),

    #[error("JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error("unable to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no ledger at {0}, run `sealvote init` first")]
    NoState(PathBuf),

    #[error("a ledger already exists at {0}, pass --force to replace it")]
    StateExists(PathBuf),

    #[error("please provide a sender either via --sender or SEALVOTE_SENDER")]
    MissingSender,

    #[error("missing argument {0}")]
    MissingArgument(&'static str),

    #[error("invalid {name} {value:?}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("transaction reverted: {0}")]
    Reverted(&'static str),

    #[error("unable to initialise logging: {0}")]
    Logging(String),
}
