pub mod xyz;
pub mod zfxy;

use std::fmt::Debug;
use std::hash::Hash;

pub type Vertices2D<T> = [T; 4];
pub type Vertices3D<T> = [T; 8];

/// A grid cell with a geographic footprint.
pub trait SpatialCell: Debug + Clone + Copy + PartialEq + Eq + Hash {
    type Coord: Copy + Default + Debug;
    type Vertices: Copy + Default + Debug + AsRef<[Self::Coord]>;

    fn centroid(&self) -> Self::Coord;

    /// Corners, counter-clockwise from south-west; 3-D cells list the bottom ring first.
    fn vertices(&self) -> Self::Vertices;

    /// (south-west-bottom, north-east-top) corners.
    fn bbox(&self) -> (Self::Coord, Self::Coord);
}
