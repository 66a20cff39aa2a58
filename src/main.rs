use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spatial_id::config::{COVER_LIMIT, DEFAULT_ZOOM};
use spatial_id::{LatLonAlt, SpatialCell, Zfxy, export, gpx, trace};

#[derive(Parser)]
#[command(
    name = "spatial-id",
    version,
    about = "Generate and inspect spatial IDs (/zoom/floor/x/y voxels)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spatial ID of a single position
    Generate {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Altitude in metres
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        alt: f64,

        /// Zoom level
        #[arg(short, long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,

        /// Print as "Spatial ID: ..."
        #[arg(short, long)]
        verbose: bool,
    },

    /// Describe a spatial ID: indices, tile hash, parent, centroid and bounds
    Info {
        /// Spatial ID, e.g. /25/10/16777216/16777216
        id: String,
    },

    /// Decode a tile hash into a spatial ID
    Hash {
        /// Tile hash, e.g. 244113223421323144
        #[arg(allow_hyphen_values = true)]
        hash: String,
    },

    /// List every voxel intersecting a bounding volume
    Cover {
        #[arg(long, allow_hyphen_values = true)]
        south: f64,

        #[arg(long, allow_hyphen_values = true)]
        west: f64,

        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        #[arg(long, allow_hyphen_values = true)]
        east: f64,

        /// Bottom altitude in metres
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        min_alt: f64,

        /// Top altitude in metres
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        max_alt: f64,

        /// Zoom level
        #[arg(short, long, default_value_t = DEFAULT_ZOOM)]
        zoom: u8,

        /// Maximum number of voxels to emit
        #[arg(long, default_value_t = COVER_LIMIT)]
        limit: usize,

        /// Also write the voxels as GeoJSON to this path
        #[arg(long)]
        geojson: Option<PathBuf>,
    },

    /// List the voxels crossed by a GPX track
    Track {
        /// GPX file
        path: PathBuf,

        /// Zoom level
        #[arg(short, long, default_value_t = 20)]
        zoom: u8,

        /// Maximum number of voxels to emit
        #[arg(long, default_value_t = COVER_LIMIT)]
        limit: usize,

        /// Also write the voxels and track as GeoJSON to this path
        #[arg(long)]
        geojson: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_ids(cells: &[Zfxy]) {
    for cell in cells {
        println!("{cell}");
    }
}

fn describe(cell: &Zfxy) {
    let centroid = cell.centroid();
    let (min, max) = cell.bbox();
    println!("id:        {cell}");
    println!("zoom:      {}", cell.zoom());
    println!("floor:     {}", cell.floor());
    println!("x:         {}", cell.x());
    println!("y:         {}", cell.y());
    println!("tile:      {}", cell.xyz_tile());
    match cell.to_tile_hash() {
        Ok(hash) => println!("tile_hash: {hash}"),
        Err(_) => println!("tile_hash: -"),
    }
    match cell.parent() {
        Some(parent) => println!("parent:    {parent}"),
        None => println!("parent:    -"),
    }
    println!(
        "centroid:  {:.8}, {:.8}, {:.3} m",
        centroid.lat, centroid.lon, centroid.alt
    );
    println!(
        "bbox:      {:.8}, {:.8}, {:.3} m .. {:.8}, {:.8}, {:.3} m",
        min.lat, min.lon, min.alt, max.lat, max.lon, max.alt
    );
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            lat,
            lon,
            alt,
            zoom,
            verbose,
        } => {
            let id = spatial_id::generate_spatial_id(lat, lon, alt, zoom)
                .with_context(|| format!("Failed to generate spatial ID for {lat}, {lon}, {alt}"))?;
            if verbose {
                println!("Spatial ID: {id}");
            } else {
                println!("{id}");
            }
        }

        Commands::Info { id } => {
            let cell: Zfxy = id
                .parse()
                .with_context(|| format!("Invalid spatial ID {id:?}"))?;
            describe(&cell);
        }

        Commands::Hash { hash } => {
            let cell = Zfxy::from_tile_hash(&hash)
                .with_context(|| format!("Invalid tile hash {hash:?}"))?;
            println!("{cell}");
        }

        Commands::Cover {
            south,
            west,
            north,
            east,
            min_alt,
            max_alt,
            zoom,
            limit,
            geojson,
        } => {
            let min = LatLonAlt::new(south, west, min_alt);
            let max = LatLonAlt::new(north, east, max_alt);
            let cells = Zfxy::bvol_cover_limited(min, max, zoom, limit)
                .context("Failed to cover bounding volume")?;
            print_ids(&cells);
            if let Some(path) = geojson {
                export::export_geojson(&export::cells_to_geojson(&cells), &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
        }

        Commands::Track {
            path,
            zoom,
            limit,
            geojson,
        } => {
            let track = gpx::load_track(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let cells = trace::trace_path(&track.points, zoom, limit)
                .with_context(|| format!("Failed to trace {}", track.name))?;
            print_ids(&cells);
            if let Some(out) = geojson {
                let data = export::track_to_geojson(&cells, &track.line_string());
                export::export_geojson(&data, &out)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
            }
        }
    }

    Ok(())
}
