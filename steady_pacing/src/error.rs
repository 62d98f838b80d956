use std::time::Duration;

use thiserror::Error;

/// Result type for pacing configuration
pub type Result<T> = std::result::Result<T, PacingError>;

/// Errors raised while configuring a paced reader
///
/// Reads never produce a `PacingError`; they surface the underlying stream's
/// `std::io::Error` unchanged.
#[derive(Debug, Error)]
pub enum PacingError {
    /// Pacing interval is zero or longer than one second
    #[error("Invalid pacing interval {0:?}: must be non-zero and at most 1s")]
    InvalidInterval(Duration),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}
