//! Web Mercator tile math.

use std::f64::consts::PI;

use crate::config::{EARTH_CIRCUMFERENCE_M, MAX_LATITUDE};

/// Tile column and row containing (lat, lon) at `zoom`.
///
/// Latitudes beyond the Mercator limit are clamped; indices are clamped to the
/// last row/column so that lon = 180 and lat = -90 stay on the grid.
pub fn latlon_to_tile_xy(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let max_index = tile_count(zoom) - 1;
    let x = lon_to_tile(lon, zoom).min(max_index);
    let y = lat_to_tile(lat, zoom).min(max_index);
    (x as u32, y as u32)
}

/// North-west corner of tile (x, y) as (lat, lon).
pub fn tile_xy_to_latlon(x: u64, y: u64, zoom: u8) -> (f64, f64) {
    tile_fraction_to_latlon(x as f64, y as f64, zoom)
}

/// Like [`tile_xy_to_latlon`] but for fractional tile positions, e.g. centres.
pub fn tile_fraction_to_latlon(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let n = 2_f64.powi(zoom as i32);
    let lon = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    (lat, lon)
}

/// Convert latitude to Web Mercator Y fraction (0.0 = top, 1.0 = bottom).
pub fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0
}

/// Width in metres of one tile at `lat` and `zoom`.
pub fn meters_per_tile(lat: f64, zoom: u8) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / 2_f64.powi(zoom as i32)
}

pub(crate) fn tile_count(zoom: u8) -> u64 {
    1_u64 << zoom
}

fn lon_to_tile(lon: f64, zoom: u8) -> u64 {
    let n = 2_f64.powi(zoom as i32);
    ((lon + 180.0) / 360.0 * n).floor().max(0.0) as u64
}

fn lat_to_tile(lat: f64, zoom: u8) -> u64 {
    let n = 2_f64.powi(zoom as i32);
    (mercator_y(lat) * n).floor().max(0.0) as u64
}
