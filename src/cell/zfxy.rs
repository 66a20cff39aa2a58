//! ZFXY voxels: a Web Mercator tile (x, y) extruded into floors (f) whose
//! height halves with every zoom level.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::xyz::XyzTile;
use super::{SpatialCell, Vertices3D};
use crate::config::{COVER_LIMIT, MAX_ALTITUDE, MAX_ZOOM};
use crate::coords::{LatLonAlt, validate_altitude, validate_lat_lon};
use crate::error::{Result, SpatialIdError};
use crate::projection::{
    latlon_to_tile_xy, tile_count, tile_fraction_to_latlon, tile_xy_to_latlon,
};

/// Fields are only set through validated constructors, so every `Zfxy`
/// satisfies `zoom <= MAX_ZOOM`, `x, y < 2^zoom` and `-2^zoom <= floor < 2^zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Zfxy {
    zoom: u8,
    floor: i32,
    x: u32,
    y: u32,
}

/// Height in metres of one floor at `zoom`.
pub fn floor_height(zoom: u8) -> f64 {
    MAX_ALTITUDE / 2_f64.powi(zoom as i32)
}

fn floor_at(alt: f64, zoom: u8) -> i64 {
    (alt / floor_height(zoom)).floor() as i64
}

fn check_zoom(zoom: u8) -> Result<()> {
    if zoom > MAX_ZOOM {
        return Err(SpatialIdError::ZoomOutOfRange(zoom));
    }
    Ok(())
}

impl Zfxy {
    /// Build a voxel from raw indices, checking they exist at `zoom`:
    /// `x, y < 2^zoom` and `-2^zoom <= floor < 2^zoom`.
    pub fn new(zoom: u8, floor: i32, x: u32, y: u32) -> Result<Self> {
        Self::checked(zoom, floor as i64, x as u64, y as u64)
    }

    fn checked(zoom: u8, floor: i64, x: u64, y: u64) -> Result<Self> {
        check_zoom(zoom)?;
        let n = tile_count(zoom);
        let floors = n as i64;
        if x >= n || y >= n || floor < -floors || floor >= floors {
            return Err(SpatialIdError::TileOutOfRange { zoom, floor, x, y });
        }
        Ok(Self {
            zoom,
            floor: floor as i32,
            x: x as u32,
            y: y as u32,
        })
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn floor(&self) -> i32 {
        self.floor
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn from_lat_lon_alt(lat: f64, lon: f64, alt: f64, zoom: u8) -> Result<Self> {
        check_zoom(zoom)?;
        validate_lat_lon(lat, lon)?;
        validate_altitude(alt)?;
        let (x, y) = latlon_to_tile_xy(lat, lon, zoom);
        Self::checked(zoom, floor_at(alt, zoom), x as u64, y as u64)
    }

    /// North-west bottom corner of the voxel.
    pub fn to_lat_lon_alt(&self) -> LatLonAlt {
        let (lat, lon) = tile_xy_to_latlon(self.x as u64, self.y as u64, self.zoom);
        LatLonAlt {
            lat,
            lon,
            alt: self.floor as f64 * floor_height(self.zoom),
        }
    }

    pub fn xyz_tile(&self) -> XyzTile {
        XyzTile {
            zoom: self.zoom,
            x: self.x,
            y: self.y,
        }
    }

    /// Altitude range `[bottom, top)` in metres.
    pub fn altitude_range(&self) -> (f64, f64) {
        let vz = floor_height(self.zoom);
        (self.floor as f64 * vz, (self.floor as f64 + 1.0) * vz)
    }

    pub fn parent(&self) -> Option<Zfxy> {
        if self.zoom == 0 {
            return None;
        }
        Some(Zfxy {
            zoom: self.zoom - 1,
            floor: self.floor.div_euclid(2),
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// The eight voxels one zoom level down, ordered by
    /// `4 * (floor & 1) + 2 * (y & 1) + (x & 1)`.
    pub fn children(&self) -> Option<[Zfxy; 8]> {
        if self.zoom >= MAX_ZOOM {
            return None;
        }
        Some(std::array::from_fn(|i| {
            let i = i as u32;
            Zfxy {
                zoom: self.zoom + 1,
                floor: self.floor * 2 + ((i >> 2) & 1) as i32,
                x: self.x * 2 + (i & 1),
                y: self.y * 2 + ((i >> 1) & 1),
            }
        }))
    }

    pub fn to_spatial_id_str(&self) -> String {
        self.to_string()
    }

    /// One digit per zoom level (`1..=8`, the child index plus one) from the
    /// root down to this voxel, computed on `|floor|` and prefixed with `-`
    /// when the floor is negative.
    ///
    /// Floor `-2^zoom` has no hash: its magnitude needs `zoom + 1` bits.
    pub fn to_tile_hash(&self) -> Result<String> {
        let f = self.floor.unsigned_abs() as u64;
        if f >= tile_count(self.zoom) {
            return Err(SpatialIdError::TileOutOfRange {
                zoom: self.zoom,
                floor: self.floor as i64,
                x: self.x as u64,
                y: self.y as u64,
            });
        }
        let (x, y) = (self.x as u64, self.y as u64);

        let mut out = String::with_capacity(self.zoom as usize + 1);
        if self.floor < 0 {
            out.push('-');
        }
        for shift in (0..self.zoom).rev() {
            let index = ((f >> shift) & 1) * 4 + ((y >> shift) & 1) * 2 + ((x >> shift) & 1);
            out.push(char::from(b'1' + index as u8));
        }
        Ok(out)
    }

    pub fn from_tile_hash(hash: &str) -> Result<Self> {
        let (negative, digits) = match hash.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, hash),
        };
        if digits.len() > MAX_ZOOM as usize {
            return Err(SpatialIdError::ZoomOutOfRange(
                digits.len().min(u8::MAX as usize) as u8,
            ));
        }

        let (mut f, mut x, mut y) = (0_u64, 0_u64, 0_u64);
        for c in digits.chars() {
            let index = match c {
                '1'..='8' => c as u64 - '1' as u64,
                _ => {
                    return Err(SpatialIdError::Parse(format!(
                        "invalid tile hash digit {c:?} in {hash:?}"
                    )));
                }
            };
            f = (f << 1) | ((index >> 2) & 1);
            y = (y << 1) | ((index >> 1) & 1);
            x = (x << 1) | (index & 1);
        }

        if negative && f == 0 {
            return Err(SpatialIdError::Parse(format!(
                "tile hash {hash:?} has a sign but a zero floor"
            )));
        }
        let floor = if negative { -(f as i64) } else { f as i64 };
        Self::checked(digits.len() as u8, floor, x, y)
    }

    /// Every voxel at `zoom` intersecting the volume spanned by `min` and `max`.
    pub fn bvol_cover(min: LatLonAlt, max: LatLonAlt, zoom: u8) -> Result<Vec<Zfxy>> {
        Self::bvol_cover_limited(min, max, zoom, COVER_LIMIT)
    }

    /// Like [`Zfxy::bvol_cover`], failing with `CoverTooLarge` instead of
    /// producing more than `limit` voxels.
    pub fn bvol_cover_limited(
        min: LatLonAlt,
        max: LatLonAlt,
        zoom: u8,
        limit: usize,
    ) -> Result<Vec<Zfxy>> {
        check_zoom(zoom)?;
        for corner in [min, max] {
            validate_lat_lon(corner.lat, corner.lon)?;
            validate_altitude(corner.alt)?;
        }

        // Tile rows grow southward, so the north edge gives the smallest y.
        let (min_x, min_y) = latlon_to_tile_xy(max.lat, min.lon, zoom);
        let (max_x, max_y) = latlon_to_tile_xy(min.lat, max.lon, zoom);
        let min_floor = floor_at(min.alt, zoom);
        let max_floor = floor_at(max.alt, zoom);

        if min_x > max_x || min_y > max_y || min_floor > max_floor {
            return Ok(Vec::new());
        }

        let cells = (max_x - min_x + 1) as u128
            * (max_y - min_y + 1) as u128
            * (max_floor - min_floor + 1) as u128;
        if cells > limit as u128 {
            return Err(SpatialIdError::CoverTooLarge { cells, limit });
        }
        debug!(zoom, cells = cells as u64, "covering bounding volume");

        let mut cover = Vec::with_capacity(cells as usize);
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                for floor in min_floor..=max_floor {
                    cover.push(Zfxy {
                        zoom,
                        floor: floor as i32,
                        x,
                        y,
                    });
                }
            }
        }
        Ok(cover)
    }
}

impl SpatialCell for Zfxy {
    type Coord = LatLonAlt;
    type Vertices = Vertices3D<Self::Coord>;

    fn centroid(&self) -> LatLonAlt {
        let (lat, lon) =
            tile_fraction_to_latlon(self.x as f64 + 0.5, self.y as f64 + 0.5, self.zoom);
        LatLonAlt {
            lat,
            lon,
            alt: (self.floor as f64 + 0.5) * floor_height(self.zoom),
        }
    }

    fn vertices(&self) -> Self::Vertices {
        let (bottom, top) = self.altitude_range();
        let ring = self.xyz_tile().vertices();
        std::array::from_fn(|i| {
            let corner = ring[i % 4];
            LatLonAlt {
                lat: corner.lat,
                lon: corner.lon,
                alt: if i < 4 { bottom } else { top },
            }
        })
    }

    fn bbox(&self) -> (LatLonAlt, LatLonAlt) {
        let (bottom, top) = self.altitude_range();
        let (sw, ne) = self.xyz_tile().bbox();
        (
            LatLonAlt {
                lat: sw.lat,
                lon: sw.lon,
                alt: bottom,
            },
            LatLonAlt {
                lat: ne.lat,
                lon: ne.lon,
                alt: top,
            },
        )
    }
}

impl fmt::Display for Zfxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}/{}/{}", self.zoom, self.floor, self.x, self.y)
    }
}

impl FromStr for Zfxy {
    type Err = SpatialIdError;

    /// Parse `/{z}/{f}/{x}/{y}`; the leading slash is optional.
    fn from_str(s: &str) -> Result<Self> {
        let body = s.strip_prefix('/').unwrap_or(s);
        let parts: Vec<&str> = body.split('/').collect();
        let &[z, f, x, y] = parts.as_slice() else {
            return Err(SpatialIdError::Parse(format!(
                "expected /z/f/x/y, got {s:?}"
            )));
        };

        let bad = |field: &str, value: &str| {
            SpatialIdError::Parse(format!("invalid {field} {value:?} in {s:?}"))
        };
        let zoom: u8 = z.parse().map_err(|_| bad("zoom", z))?;
        let floor: i64 = f.parse().map_err(|_| bad("floor", f))?;
        let x: u64 = x.parse().map_err(|_| bad("x", x))?;
        let y: u64 = y.parse().map_err(|_| bad("y", y))?;
        Self::checked(zoom, floor, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_LATITUDE;
    use approx::assert_abs_diff_eq;

    const EPSILON: f64 = 1e-9;

    fn cell(zoom: u8, floor: i32, x: u32, y: u32) -> Zfxy {
        Zfxy { zoom, floor, x, y }
    }

    #[test]
    fn test_centroid() {
        let c = cell(1, 0, 0, 0).centroid();
        assert_abs_diff_eq!(c.lat, 66.51326044311186, epsilon = EPSILON);
        assert_abs_diff_eq!(c.lon, -90.0, epsilon = EPSILON);
        assert_eq!(c.alt, 8_388_608.0);
    }

    #[test]
    fn test_vertices() {
        let vertices = cell(1, 0, 0, 0).vertices();
        let expected = [
            (0.0, -180.0, 0.0),
            (0.0, 0.0, 0.0),
            (MAX_LATITUDE, 0.0, 0.0),
            (MAX_LATITUDE, -180.0, 0.0),
            (0.0, -180.0, 16_777_216.0),
            (0.0, 0.0, 16_777_216.0),
            (MAX_LATITUDE, 0.0, 16_777_216.0),
            (MAX_LATITUDE, -180.0, 16_777_216.0),
        ];
        for (v, (lat, lon, alt)) in vertices.iter().zip(expected) {
            assert_abs_diff_eq!(v.lat, lat, epsilon = EPSILON);
            assert_abs_diff_eq!(v.lon, lon, epsilon = EPSILON);
            assert_eq!(v.alt, alt);
        }
    }

    #[test]
    fn test_bbox_uses_metres() {
        let (min, max) = cell(25, 10, 16_777_216, 16_777_216).bbox();
        assert_eq!(min.alt, 10.0);
        assert_eq!(max.alt, 11.0);
        assert_abs_diff_eq!(min.lon, 0.0, epsilon = EPSILON);
        assert_abs_diff_eq!(max.lat, 0.0, epsilon = EPSILON);
        assert!(min.lat < 0.0);
        assert!(max.lon > 0.0);
    }

    #[test]
    fn test_from_lat_lon_alt() {
        let c = Zfxy::from_lat_lon_alt(0.0, 0.0, 10.0, 25).unwrap();
        assert_eq!(c, cell(25, 10, 16_777_216, 16_777_216));
    }

    #[test]
    fn test_floor_scales_with_zoom() {
        // 2^25 m split into 2^20 floors of 32 m.
        assert_eq!(Zfxy::from_lat_lon_alt(0.0, 0.0, 100.0, 20).unwrap().floor, 3);
        assert_eq!(Zfxy::from_lat_lon_alt(0.0, 0.0, -0.5, 25).unwrap().floor, -1);
        assert_eq!(Zfxy::from_lat_lon_alt(0.0, 0.0, 5.0, 0).unwrap().floor, 0);
    }

    #[test]
    fn test_from_lat_lon_alt_rejects_bad_input() {
        assert!(matches!(
            Zfxy::from_lat_lon_alt(0.0, 0.0, 0.0, 32),
            Err(SpatialIdError::ZoomOutOfRange(32))
        ));
        assert!(matches!(
            Zfxy::from_lat_lon_alt(f64::NAN, 0.0, 0.0, 10),
            Err(SpatialIdError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            Zfxy::from_lat_lon_alt(0.0, 0.0, MAX_ALTITUDE, 10),
            Err(SpatialIdError::AltitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_max_zoom_extremes() {
        let c = Zfxy::from_lat_lon_alt(-90.0, 180.0, -MAX_ALTITUDE + 1e-3, MAX_ZOOM).unwrap();
        assert_eq!(c.x, u32::MAX >> 1);
        assert_eq!(c.y, u32::MAX >> 1);
        assert_eq!(c.floor, i32::MIN);
        assert!(c.children().is_none());
        assert!(c.to_tile_hash().is_err());
    }

    #[test]
    fn test_accessors() {
        let c = Zfxy::new(10, -3, 901, 402).unwrap();
        assert_eq!((c.zoom(), c.floor(), c.x(), c.y()), (10, -3, 901, 402));
    }

    #[test]
    fn test_to_lat_lon_alt() {
        let p = cell(25, 10, 16_777_216, 16_777_216).to_lat_lon_alt();
        assert_eq!(
            p,
            LatLonAlt {
                lat: 0.0,
                lon: 0.0,
                alt: 10.0,
            }
        );
    }

    #[test]
    fn test_centroid_maps_back_to_cell() {
        for &(lat, lon, alt, zoom) in &[
            (35.0, 135.0, 0.0, 25),
            (-33.8688, 151.2093, 58.0, 20),
            (51.5074, -0.1278, -12.3, 16),
            (64.1466, -21.9426, 1500.0, 8),
        ] {
            let c = Zfxy::from_lat_lon_alt(lat, lon, alt, zoom).unwrap();
            let centre = c.centroid();
            let back = Zfxy::from_lat_lon_alt(centre.lat, centre.lon, centre.alt, zoom).unwrap();
            assert_eq!(back, c);
        }
    }

    #[test]
    fn test_parent_and_children() {
        let c = cell(10, -3, 901, 402);
        let parent = c.parent().unwrap();
        assert_eq!(parent, cell(9, -2, 450, 201));
        let children = parent.children().unwrap();
        assert!(children.contains(&c));
        for child in children {
            assert_eq!(child.parent(), Some(parent));
        }
        assert!(cell(0, 0, 0, 0).parent().is_none());
    }

    #[test]
    fn test_children_order() {
        let children = cell(0, 0, 0, 0).children().unwrap();
        assert_eq!(children[0], cell(1, 0, 0, 0));
        assert_eq!(children[1], cell(1, 0, 1, 0));
        assert_eq!(children[2], cell(1, 0, 0, 1));
        assert_eq!(children[7], cell(1, 1, 1, 1));
    }

    #[test]
    fn test_to_tile_hash() {
        let c = Zfxy::from_lat_lon_alt(0.0, 0.0, 10.0, 25).unwrap();
        assert_eq!(c.to_tile_hash().unwrap(), "4111111111111111111115151");
        assert_eq!(
            cell(18, 0, 232_851, 103_211).to_tile_hash().unwrap(),
            "244113223421323144"
        );
        assert_eq!(cell(0, 0, 0, 0).to_tile_hash().unwrap(), "");
    }

    #[test]
    fn test_to_tile_hash_negative_floor() {
        // sign prefix plus the hash of |floor|
        assert_eq!(cell(2, -1, 0, 0).to_tile_hash().unwrap(), "-15");
        assert_eq!(cell(3, -5, 2, 6).to_tile_hash().unwrap(), "-745");
        assert_eq!(cell(3, 5, 2, 6).to_tile_hash().unwrap(), "745");
    }

    #[test]
    fn test_to_tile_hash_rejects_lowest_floor() {
        assert!(matches!(
            cell(2, -4, 0, 0).to_tile_hash(),
            Err(SpatialIdError::TileOutOfRange { floor: -4, .. })
        ));
        assert!(cell(0, -1, 0, 0).to_tile_hash().is_err());
        assert!(cell(2, -3, 0, 0).to_tile_hash().is_ok());
    }

    #[test]
    fn test_from_tile_hash() {
        assert_eq!(
            Zfxy::from_tile_hash("244113223421323144").unwrap(),
            cell(18, 0, 232_851, 103_211)
        );
        assert_eq!(Zfxy::from_tile_hash("").unwrap(), cell(0, 0, 0, 0));
        assert_eq!(Zfxy::from_tile_hash("-15").unwrap(), cell(2, -1, 0, 0));
        for c in [
            cell(3, 5, 2, 6),
            cell(3, -7, 7, 0),
            cell(12, -100, 4000, 17),
        ] {
            assert_eq!(Zfxy::from_tile_hash(&c.to_tile_hash().unwrap()).unwrap(), c);
        }
        assert!(Zfxy::from_tile_hash("-").is_err());
        assert!(Zfxy::from_tile_hash("-11").is_err());
        assert!(Zfxy::from_tile_hash("129").is_err());
        assert!(Zfxy::from_tile_hash("1a").is_err());
        assert!(matches!(
            Zfxy::from_tile_hash(&"1".repeat(32)),
            Err(SpatialIdError::ZoomOutOfRange(32))
        ));
    }

    #[test]
    fn test_to_spatial_id_str() {
        let c = Zfxy::from_lat_lon_alt(0.0, 0.0, 10.0, 25).unwrap();
        assert_eq!(c.to_spatial_id_str(), "/25/10/16777216/16777216");
        assert_eq!(c.to_string(), c.to_spatial_id_str());
    }

    #[test]
    fn test_parse() {
        let c: Zfxy = "/25/10/16777216/16777216".parse().unwrap();
        assert_eq!(c, cell(25, 10, 16_777_216, 16_777_216));
        let c: Zfxy = "3/-2/1/5".parse().unwrap();
        assert_eq!(c, cell(3, -2, 1, 5));

        assert!("/25/10/16777216".parse::<Zfxy>().is_err());
        assert!("/25/10/16777216/16777216/".parse::<Zfxy>().is_err());
        assert!("/a/0/0/0".parse::<Zfxy>().is_err());
        assert!(matches!(
            "/2/0/4/0".parse::<Zfxy>(),
            Err(SpatialIdError::TileOutOfRange { .. })
        ));
        assert!("/2/-5/0/0".parse::<Zfxy>().is_err());
        assert!("/40/0/0/0".parse::<Zfxy>().is_err());
    }

    #[test]
    fn test_new_validates() {
        assert!(Zfxy::new(2, 3, 3, 3).is_ok());
        assert!(Zfxy::new(2, 4, 0, 0).is_err());
        assert!(Zfxy::new(2, -4, 0, 0).is_ok());
        assert!(Zfxy::new(2, 0, 0, 4).is_err());
    }

    #[test]
    fn test_bvol_cover() {
        let min = LatLonAlt::new(35.0, 135.0, 0.0);
        let max = LatLonAlt::new(35.001, 135.001, 2.5);
        let cover = Zfxy::bvol_cover(min, max, 20).unwrap();

        let (min_x, min_y) = latlon_to_tile_xy(max.lat, min.lon, 20);
        let (max_x, max_y) = latlon_to_tile_xy(min.lat, max.lon, 20);
        let expected = (max_x - min_x + 1) as usize * (max_y - min_y + 1) as usize;
        // floors of 32 m: 0.0 and 2.5 are both in floor 0
        assert_eq!(cover.len(), expected);
        assert!(cover.iter().all(|c| c.zoom == 20 && c.floor == 0));
        assert_eq!(cover[0], cell(20, 0, min_x, min_y));

        let point = Zfxy::from_lat_lon_alt(35.0005, 135.0005, 1.0, 20).unwrap();
        assert!(cover.contains(&point));
    }

    #[test]
    fn test_bvol_cover_floor_order_and_empty() {
        let p = LatLonAlt::new(0.5, 0.5, 0.0);
        let cover = Zfxy::bvol_cover(p, LatLonAlt { alt: 3.0, ..p }, 25).unwrap();
        let floors: Vec<i32> = cover.iter().map(|c| c.floor).collect();
        assert_eq!(floors, vec![0, 1, 2, 3]);

        let empty = Zfxy::bvol_cover(LatLonAlt { alt: 5.0, ..p }, p, 25).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_bvol_cover_limit() {
        let min = LatLonAlt::new(-10.0, -10.0, 0.0);
        let max = LatLonAlt::new(10.0, 10.0, 100.0);
        assert!(matches!(
            Zfxy::bvol_cover_limited(min, max, 25, 1000),
            Err(SpatialIdError::CoverTooLarge { limit: 1000, .. })
        ));
    }
}
