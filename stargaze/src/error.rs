//! Domain errors raised by the ephemeris, catalog and calendar parsers

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StargazeError {
    #[error("catalog line {line}: {reason}")]
    CatalogLine { line: usize, reason: String },

    #[error("invalid orbital elements: {0}")]
    InvalidElements(String),

    #[error("Kepler solver did not converge after {iterations} iterations (dt = {dt_days} d)")]
    NoConvergence { iterations: usize, dt_days: f64 },

    #[error("ICS line {line}: {reason}")]
    Ics { line: usize, reason: String },

    #[error("invalid date/time: {0}")]
    InvalidTime(String),

    #[error("unknown time zone: {0}")]
    UnknownTimeZone(String),
}

pub type Result<T> = std::result::Result<T, StargazeError>;
