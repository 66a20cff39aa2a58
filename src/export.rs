use geo_types::LineString;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;

use tracing::info;

use crate::cell::SpatialCell;
use crate::cell::zfxy::Zfxy;
use crate::error::Result;

/// GeoJSON FeatureCollection with one footprint polygon per voxel.
pub fn cells_to_geojson(cells: &[Zfxy]) -> Value {
    let features: Vec<Value> = cells.iter().map(cell_feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Same as [`cells_to_geojson`] with the traced path appended as a LineString.
pub fn track_to_geojson(cells: &[Zfxy], track: &LineString<f64>) -> Value {
    let mut features: Vec<Value> = cells.iter().map(cell_feature).collect();
    let coords: Vec<Value> = track.0.iter().map(|c| json!([c.x, c.y])).collect();
    features.push(json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": coords,
        },
        "properties": {
            "kind": "track",
        },
    }));
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn export_geojson(data: &Value, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let json_str = serde_json::to_string(data)?;
    fs::write(output, json_str)?;

    let count = data["features"].as_array().map_or(0, Vec::len);
    info!(path = %output.display(), features = count, "exported GeoJSON");
    Ok(())
}

fn cell_feature(cell: &Zfxy) -> Value {
    let ring = cell.xyz_tile().vertices();
    let mut polygon: Vec<Value> = ring.iter().map(|v| json!([v.lon, v.lat])).collect();
    polygon.push(json!([ring[0].lon, ring[0].lat]));
    let (alt_min, alt_max) = cell.altitude_range();
    let (min, max) = cell.bbox();

    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [polygon],
        },
        "properties": {
            "id": cell.to_spatial_id_str(),
            "zoom": cell.zoom(),
            "floor": cell.floor(),
            "x": cell.x(),
            "y": cell.y(),
            "alt_min": alt_min,
            "alt_max": alt_max,
            "centroid": cell.centroid(),
            "bbox": [min, max],
            // null for the lowest floor, which has no hash
            "tile_hash": cell.to_tile_hash().ok(),
        },
    })
}
