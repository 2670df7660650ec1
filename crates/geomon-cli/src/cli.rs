use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Geomon - spatial footprint of monitored OGC requests
#[derive(Parser, Debug)]
#[command(name = "geomon")]
#[command(about = "Extract the centroids of the regions a request touched", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./geomon.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract bbox and filter centroids from a request
    Extract(ExtractArgs),

    /// Show the effective configuration and where each value comes from
    Config,

    /// List the CRS URIs a coverage collection advertises
    Crs(CrsArgs),
}

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Raw query string, e.g. "CQL_FILTER=INTERSECTS(the_geom, POINT(1 2))"
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Request bounding box as x1,y1,x2,y2 (any two opposite corners)
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<[f64; 4]>,

    /// CRS of the bounding box
    #[arg(long, default_value = "EPSG:4326")]
    pub bbox_crs: String,

    /// CRS of filter geometries without an SRID (e.g. 4326, EPSG:3857)
    #[arg(long)]
    pub crs: Option<String>,

    /// How AND-ed predicates combine (intersect or per-attribute)
    #[arg(long)]
    pub conjunction: Option<String>,

    /// Geometry validity mode (strict or lenient)
    #[arg(long)]
    pub validity_mode: Option<String>,

    /// Comma-separated query-string keys carrying the filter
    #[arg(long, value_name = "KEYS")]
    pub filter_keys: Option<String>,

    /// Print a GeoJSON FeatureCollection of the centroids (takes precedence over --json)
    #[arg(long)]
    pub geojson: bool,
}

#[derive(Parser, Debug)]
pub struct CrsArgs {
    /// Comma-separated response SRS codes declared by the coverage
    #[arg(long, value_name = "CODES")]
    pub response_srs: Option<String>,

    /// Comma-separated EPSG codes configured on the service
    #[arg(long, value_name = "CODES")]
    pub service_srs: Option<String>,

    /// Comma-separated codes known to the CRS database
    #[arg(long, value_name = "CODES", default_value = "4326,3857")]
    pub supported: String,
}

/// Parse `x1,y1,x2,y2`
fn parse_bbox(s: &str) -> Result<[f64; 4], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("Invalid bbox number: {}", e))?;

    <[f64; 4]>::try_from(values)
        .map_err(|v| format!("Expected 4 comma-separated numbers, got {}", v.len()))
}

/// Split a comma-separated code list, dropping blanks
pub fn split_codes(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|c| !c.is_empty()).map(String::from).collect()
}
