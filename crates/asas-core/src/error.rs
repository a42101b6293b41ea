//! Error types for separation-assurance setup.
//!
//! Only configuration can fail. Everything evaluated per tick degrades to
//! "no conflict" instead of returning an error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating [`crate::rules::SeparationRules`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A scalar that must be strictly positive and finite was not.
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// The resolution margin would shrink the protected zone.
    #[error("resolution_margin must be >= 1.0, got {0}")]
    MarginTooSmall(f64),

    /// A noise standard deviation was negative or not finite.
    #[error("noise deviation {field} must be >= 0, got {value}")]
    NegativeDeviation { field: &'static str, value: f64 },

    /// Experiment window bounds are inverted.
    #[error("experiment window start ({start_s}s) is after its end ({end_s}s)")]
    InvertedWindow { start_s: f64, end_s: f64 },

    /// Ring count outside the supported range.
    #[error("zone ring count must be between 1 and {max}, got {got}")]
    RingCount { got: u8, max: u8 },

    /// A zone layout name was left empty.
    #[error("zone layout field {0} must not be empty")]
    EmptyName(&'static str),

    /// Failed to read a rules file.
    #[error("Failed to read rules file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    /// Rules file was not valid JSON for the expected layout.
    #[error("Invalid rules JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised when an area definition is malformed.
#[derive(Debug, Error, PartialEq)]
pub enum AreaError {
    /// Polygon with too few vertices to enclose anything.
    #[error("area {name}: polygon needs at least 3 vertices, got {got}")]
    TooFewVertices { name: String, got: usize },

    /// Circle radius must be positive.
    #[error("area {name}: circle radius must be positive, got {radius_m}")]
    BadRadius { name: String, radius_m: f64 },

    /// Altitude band floor above its ceiling.
    #[error("area {name}: bottom {bottom_m}m is above top {top_m}m")]
    InvertedBand {
        name: String,
        bottom_m: f64,
        top_m: f64,
    },
}
