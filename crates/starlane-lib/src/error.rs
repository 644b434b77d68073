use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenient result alias for the starlane library.
pub type Result<T> = std::result::Result<T, Error>;

/// Which end of a route a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Origin,
    Destination,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Endpoint::Origin => "Origin",
            Endpoint::Destination => "Destination",
        };
        f.write_str(value)
    }
}

/// Failure classification surfaced to callers of the route finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Capacity,
    NoTransits,
    Disconnected,
    EmptyResult,
    /// The caller cancelled the search. Not an alarm condition.
    Cancellation,
    Internal,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the origin or destination is not among the pruned stars.
    #[error("{endpoint} star '{name}' is not in the available stars (may have been excluded)")]
    UnknownStar { endpoint: Endpoint, name: String },

    /// Raised when the distance bounds cannot describe a jump range.
    #[error("invalid distance bounds: lower {lower}, upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },

    /// Raised when a star carries coordinates that cannot produce a distance.
    #[error("star '{name}' has non-finite coordinates")]
    InvalidPosition { name: String },

    /// Raised when the number of requested paths is zero.
    #[error("at least one path must be requested")]
    NoPathsRequested,

    /// Raised when too many stars remain after pruning.
    #[error("too many stars ({count}) to plan a route. Maximum is {max}")]
    Capacity { count: usize, max: usize },

    /// Raised when no star pair falls within the distance bounds.
    #[error(
        "no transits found between {lower} and {upper} ly. Try adjusting upper/lower bounds"
    )]
    NoTransits { lower: f64, upper: f64 },

    /// Raised when origin and destination lie in different components.
    #[error(
        "no path exists between {origin} and {destination} with the given parameters. \
         Try adjusting distance bounds or removing exclusions"
    )]
    Disconnected { origin: String, destination: String },

    /// Raised when path search or assembly yields nothing usable.
    #[error("no valid routes found between {origin} and {destination}")]
    EmptyResult { origin: String, destination: String },

    /// Raised when the caller cancelled an in-flight search.
    #[error("route search was cancelled")]
    Cancelled,

    /// Raised for unexpected failures, including panics inside a stage.
    #[error("route finding failed: {message}")]
    Internal { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for configuration parse errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownStar { .. }
            | Error::InvalidBounds { .. }
            | Error::InvalidPosition { .. }
            | Error::NoPathsRequested
            | Error::Json(_) => ErrorKind::Validation,
            Error::Capacity { .. } => ErrorKind::Capacity,
            Error::NoTransits { .. } => ErrorKind::NoTransits,
            Error::Disconnected { .. } => ErrorKind::Disconnected,
            Error::EmptyResult { .. } => ErrorKind::EmptyResult,
            Error::Cancelled => ErrorKind::Cancellation,
            Error::Internal { .. } | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error was caused by an intentional cancellation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
