//! Error types for spatial ID generation and parsing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpatialIdError {
    /// Latitude or longitude is NaN, infinite, or outside its degree range.
    #[error("invalid {name}: {value}")]
    InvalidCoordinate { name: &'static str, value: f64 },

    /// Altitude is not finite or beyond the voxel grid's vertical extent.
    #[error("altitude out of range: {0} m")]
    AltitudeOutOfRange(f64),

    #[error("zoom out of range: {0} (max {max})", max = crate::config::MAX_ZOOM)]
    ZoomOutOfRange(u8),

    /// Malformed spatial ID or tile hash.
    #[error("parse error: {0}")]
    Parse(String),

    /// Indices do not exist at the given zoom.
    #[error("tile out of range: /{zoom}/{floor}/{x}/{y}")]
    TileOutOfRange {
        zoom: u8,
        floor: i64,
        x: u64,
        y: u64,
    },

    #[error("cover would produce {cells} cells (limit {limit})")]
    CoverTooLarge { cells: u128, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPX error: {0}")]
    Gpx(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpatialIdError>;
