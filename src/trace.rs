//! Voxels crossed by a 3-D polyline.

use std::collections::HashSet;

use tracing::debug;

use crate::cell::zfxy::{Zfxy, floor_height};
use crate::config::EARTH_RADIUS_M;
use crate::coords::LatLonAlt;
use crate::error::{Result, SpatialIdError};
use crate::projection::meters_per_tile;

/// Distinct voxels along `points` at `zoom`, in the order the path enters them.
///
/// Each leg is sampled at most half a voxel apart (horizontally and
/// vertically), so consecutive samples cannot skip over a voxel.
pub fn trace_path(points: &[LatLonAlt], zoom: u8, limit: usize) -> Result<Vec<Zfxy>> {
    let mut seen = HashSet::new();
    let mut cells = Vec::new();
    let mut push = |p: &LatLonAlt| -> Result<()> {
        let cell = Zfxy::from_lat_lon_alt(p.lat, p.lon, p.alt, zoom)?;
        if seen.insert(cell) {
            if cells.len() == limit {
                return Err(SpatialIdError::CoverTooLarge {
                    cells: limit as u128 + 1,
                    limit,
                });
            }
            cells.push(cell);
        }
        Ok(())
    };

    let Some(first) = points.first() else {
        return Ok(Vec::new());
    };
    push(first)?;

    let vz = floor_height(zoom);
    for window in points.windows(2) {
        let (a, b) = (window[0], window[1]);
        let horizontal_m = haversine_m(a.lat, a.lon, b.lat, b.lon);
        let vertical_m = (b.alt - a.alt).abs();

        // Tile width shrinks toward the poles; size the step for the narrower end.
        let tile_m = meters_per_tile(a.lat.abs().max(b.lat.abs()), zoom);
        let h_steps = (horizontal_m / (tile_m / 2.0)).ceil();
        let v_steps = (vertical_m / (vz / 2.0)).ceil();
        let steps = h_steps.max(v_steps).max(1.0);
        if steps > limit as f64 * 4.0 {
            return Err(SpatialIdError::CoverTooLarge {
                cells: steps as u128,
                limit,
            });
        }

        // Take the short way round, matching the haversine distance.
        let dlon = wrap_lon(b.lon - a.lon);
        let steps = steps as usize;
        for i in 1..=steps {
            let frac = i as f64 / steps as f64;
            push(&LatLonAlt {
                lat: a.lat + (b.lat - a.lat) * frac,
                lon: wrap_lon(a.lon + dlon * frac),
                alt: a.alt + (b.alt - a.alt) * frac,
            })?;
        }
    }

    debug!(
        points = points.len(),
        cells = cells.len(),
        zoom,
        "traced path"
    );
    Ok(cells)
}

/// Bring a longitude (or longitude difference) into [-180, 180].
fn wrap_lon(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_M * 2.0 * a.sqrt().asin()
}
