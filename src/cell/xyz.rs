use std::fmt;

use super::{SpatialCell, Vertices2D};
use crate::coords::{LatLon, validate_lat_lon};
use crate::error::{Result, SpatialIdError};
use crate::projection::{latlon_to_tile_xy, tile_fraction_to_latlon, tile_xy_to_latlon};

/// A 2-D slippy-map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XyzTile {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl XyzTile {
    pub fn from_lat_lon(lat: f64, lon: f64, zoom: u8) -> Result<Self> {
        if zoom > crate::config::MAX_ZOOM {
            return Err(SpatialIdError::ZoomOutOfRange(zoom));
        }
        validate_lat_lon(lat, lon)?;
        let (x, y) = latlon_to_tile_xy(lat, lon, zoom);
        Ok(Self { zoom, x, y })
    }

    fn corners(&self) -> (LatLon, LatLon) {
        let (lat_n, lon_w) = tile_xy_to_latlon(self.x as u64, self.y as u64, self.zoom);
        let (lat_s, lon_e) =
            tile_xy_to_latlon(self.x as u64 + 1, self.y as u64 + 1, self.zoom);
        (
            LatLon {
                lat: lat_s,
                lon: lon_w,
            },
            LatLon {
                lat: lat_n,
                lon: lon_e,
            },
        )
    }
}

impl SpatialCell for XyzTile {
    type Coord = LatLon;
    type Vertices = Vertices2D<Self::Coord>;

    fn centroid(&self) -> LatLon {
        let (lat, lon) =
            tile_fraction_to_latlon(self.x as f64 + 0.5, self.y as f64 + 0.5, self.zoom);
        LatLon { lat, lon }
    }

    fn vertices(&self) -> Self::Vertices {
        let (sw, ne) = self.corners();
        [
            sw,
            LatLon {
                lat: sw.lat,
                lon: ne.lon,
            },
            ne,
            LatLon {
                lat: ne.lat,
                lon: sw.lon,
            },
        ]
    }

    fn bbox(&self) -> (LatLon, LatLon) {
        self.corners()
    }
}

impl fmt::Display for XyzTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}", self.zoom, self.x, self.y)
    }
}
