//! Event bus failure modes (§4.D Failures)

use thiserror::Error;

/// Result alias for event bus operations.
pub type EventResult<T> = std::result::Result<T, EventError>;

/// Errors raised by the event bus.
#[derive(Debug, Error)]
pub enum EventError {
    /// A pattern subscription's glob failed to compile.
    #[error("invalid subscription pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern string.
        pattern: String,
        /// The underlying glob compiler error.
        #[source]
        source: globset::Error,
    },

    /// A handler did not finish within its allotted time and was cancelled
    /// (§4.D, handler timeout).
    #[error("handler for subscription {0} timed out")]
    HandlerTimeout(u64),

    /// `publish` was called after the bus had no remaining subscribers and
    /// is being torn down; the event was dropped.
    #[error("event bus is closed")]
    Closed,
}
