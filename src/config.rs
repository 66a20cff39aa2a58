/// Latitude limit of the Web Mercator projection; beyond it latitudes are clamped.
pub const MAX_LATITUDE: f64 = 85.05112877980659;

/// Vertical extent (metres) of one floor at zoom 0: 2^25 m.
pub const MAX_ALTITUDE: f64 = 33_554_432.0;

/// Largest zoom whose tile indices fit in `u32` and floors in `i32`.
pub const MAX_ZOOM: u8 = 31;

/// Zoom at which one floor is exactly one metre tall.
pub const DEFAULT_ZOOM: u8 = 25;

pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.68557849;
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Maximum number of voxels a single cover or trace may produce.
pub const COVER_LIMIT: usize = 1_000_000;
