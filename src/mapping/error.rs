//! Error definitions for the mapping module

use thiserror::Error;

/// Failures of the key injection primitive
///
/// None of these is fatal. The dispatcher retries once in a degraded form and
/// drops the event afterwards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    /// The host surface does not know the key code
    #[error("Unsupported key code: {0}")]
    UnsupportedCode(String),

    /// The host surface is gone or cannot take more input right now
    #[error("Surface unavailable: {0}")]
    SurfaceUnavailable(String),
}
