use geo_types::{Coord, Point};
use serde::Serialize;

use crate::config::MAX_ALTITUDE;
use crate::error::{Result, SpatialIdError};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LatLonAlt {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl LatLonAlt {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }

    pub fn horizontal(&self) -> LatLon {
        LatLon {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl From<LatLon> for Coord<f64> {
    fn from(p: LatLon) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<LatLonAlt> for Coord<f64> {
    fn from(p: LatLonAlt) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

impl From<LatLon> for Point<f64> {
    fn from(p: LatLon) -> Self {
        Point::new(p.lon, p.lat)
    }
}

/// Reject NaN/infinite values and degrees outside [-90, 90] x [-180, 180].
pub fn validate_lat_lon(lat: f64, lon: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(SpatialIdError::InvalidCoordinate {
            name: "latitude",
            value: lat,
        });
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(SpatialIdError::InvalidCoordinate {
            name: "longitude",
            value: lon,
        });
    }
    Ok(())
}

pub fn validate_altitude(alt: f64) -> Result<()> {
    if !alt.is_finite() || alt.abs() >= MAX_ALTITUDE {
        return Err(SpatialIdError::AltitudeOutOfRange(alt));
    }
    Ok(())
}
