//! Error types for Geomon

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeomonError {
    // Geometry errors
    #[error("Invalid WKT '{wkt}': {reason}")]
    InvalidWkt { wkt: String, reason: String },

    #[error("Invalid geometry at {location}: {reason}")]
    InvalidGeometry { location: String, reason: String },

    // CRS errors
    #[error("CRS mismatch: cannot combine {left} with {right}")]
    CrsMismatch { left: String, right: String },

    #[error("Unknown CRS identifier: {code}")]
    UnknownCrs { code: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GeomonError>;
