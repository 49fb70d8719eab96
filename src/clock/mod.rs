//! World clock and time resolution.
//!
//! Resolves "what time is it in location X" against a static timezone
//! table first, falling back to a remote time-by-coordinates API, and
//! runs the optional background clock display loop.

pub mod display_loop;
pub mod resolver;

use thiserror::Error;

pub use display_loop::ClockDisplayLoop;
pub use resolver::{ResolvedTime, TimeResolver, TimeSource};

/// Time resolution errors.
#[derive(Debug, Error)]
pub enum ClockError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Time API key not configured")]
    ApiKeyMissing,

    #[error("Time API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid timezone identifier: {0}")]
    InvalidZone(String),
}
