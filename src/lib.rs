//! Spatial IDs: `/{zoom}/{floor}/{x}/{y}` voxel identifiers on the Web
//! Mercator tile grid, with floors of `2^25 / 2^zoom` metres.
//!
//! ```
//! let id = spatial_id::generate_spatial_id(0.0, 0.0, 10.0, 25).unwrap();
//! assert_eq!(id, "/25/10/16777216/16777216");
//! ```

pub mod cell;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod gpx;
pub mod projection;
pub mod trace;

pub use cell::SpatialCell;
pub use cell::xyz::XyzTile;
pub use cell::zfxy::Zfxy;
pub use coords::{LatLon, LatLonAlt};
pub use error::{Result, SpatialIdError};

/// Spatial ID of the voxel containing (lat, lon, alt) at `zoom`.
///
/// The result always starts with `/{zoom}/`.
pub fn generate_spatial_id(lat: f64, lon: f64, alt: f64, zoom: u8) -> Result<String> {
    let cell = Zfxy::from_lat_lon_alt(lat, lon, alt, zoom)?;
    tracing::trace!(lat, lon, alt, zoom, id = %cell, "generated spatial id");
    Ok(cell.to_spatial_id_str())
}
