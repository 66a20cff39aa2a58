use geo_types::LineString;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::coords::LatLonAlt;
use crate::error::{Result, SpatialIdError};

#[derive(Debug)]
pub struct Track {
    pub name: String,
    pub points: Vec<LatLonAlt>,
}

impl Track {
    /// 2-D footprint of the track (x = lon, y = lat).
    pub fn line_string(&self) -> LineString<f64> {
        LineString::from(
            self.points
                .iter()
                .map(|p| (p.lon, p.lat))
                .collect::<Vec<_>>(),
        )
    }
}

pub fn load_track(path: &Path) -> Result<Track> {
    let file = File::open(path)?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let track = read_track(BufReader::new(file), &fallback)?;
    debug!(
        path = %path.display(),
        points = track.points.len(),
        "loaded GPX track"
    );
    Ok(track)
}

/// All track and route points of a GPX document, in file order. Missing
/// elevations read as 0 m.
pub fn read_track<R: Read>(reader: R, fallback_name: &str) -> Result<Track> {
    let gpx_data = gpx::read(reader).map_err(|e| SpatialIdError::Gpx(e.to_string()))?;

    let name = gpx_data
        .metadata
        .and_then(|m| m.name)
        .unwrap_or_else(|| fallback_name.to_string());

    let mut points = Vec::new();
    let mut missing_elevation = 0_usize;

    let waypoints = gpx_data
        .tracks
        .iter()
        .flat_map(|t| t.segments.iter())
        .flat_map(|s| s.points.iter())
        .chain(gpx_data.routes.iter().flat_map(|r| r.points.iter()));

    for waypoint in waypoints {
        let point = waypoint.point();
        let alt = waypoint.elevation.unwrap_or_else(|| {
            missing_elevation += 1;
            0.0
        });
        points.push(LatLonAlt {
            lat: point.y(),
            lon: point.x(),
            alt,
        });
    }

    if missing_elevation > 0 {
        warn!(
            track = %name,
            count = missing_elevation,
            "points without elevation, assuming 0 m"
        );
    }

    Ok(Track { name, points })
}
