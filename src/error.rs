//! Error types for metroscan.

use thiserror::Error;

/// Failures produced by the sampler and the scan driver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A parameter was rejected before any chain step ran.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The non-negative subset of a trace was empty, so the integral
    /// estimate is undefined. Never coerced to zero or NaN.
    #[error("estimate undefined: trace has no non-negative samples")]
    EmptyEstimate,
}

/// Result type for metroscan operations.
pub type Result<T> = std::result::Result<T, Error>;
