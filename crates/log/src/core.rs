//! Error and result types

use thiserror::Error;

/// Failures while setting up logging.
#[derive(Debug, Error)]
pub enum LogError {
    /// The filter directive string could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// A runtime reconfiguration failed.
    #[error("log configuration error: {0}")]
    Config(String),

    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Init(String),
}

pub type LogResult<T> = Result<T, LogError>;
