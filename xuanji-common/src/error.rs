//! Common error types for Xuanji

use thiserror::Error;

/// Common result type for Xuanji operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the almanac library and the oracle service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input (malformed date, time, or out-of-range value)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
