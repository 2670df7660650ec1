//! Canonical geometry-related types shared by all geomon crates.
//!
//! Geometry values themselves belong to the engine adapter; this module only
//! holds what the request model and the configuration need to talk about.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crs::{DEFAULT_CRS, CRS_PREFIX};
use crate::error::{GeomonError, Result};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// Web Mercator (EPSG:3857)
    pub fn web_mercator() -> Self {
        Self::new(3857, "Web Mercator")
    }

    /// Build a CRS from a bare EPSG code, naming the well-known ones
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            3857 => Self::web_mercator(),
            _ => Self::new(epsg, format!("EPSG:{}", epsg)),
        }
    }

    /// Parse a CRS identifier as it appears in requests and filters.
    ///
    /// Accepts `EPSG:n`, bare `n`, `urn:ogc:def:crs:EPSG::n`,
    /// `urn:x-ogc:def:crs:EPSG:n`, the OGC EPSG URI and the
    /// `http://www.opengis.net/gml/srs/epsg.xml#n` form. `CRS:84` and the
    /// CRS84 URI map onto EPSG:4326 since no axis reordering is done here.
    pub fn parse(code: &str) -> Result<Self> {
        let trimmed = code.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower == "crs:84" || lower == "crs84" || trimmed == DEFAULT_CRS {
            return Ok(Self::wgs84());
        }

        let digits = if let Some(rest) = lower.strip_prefix("epsg:") {
            rest
        } else if let Some(rest) = lower.strip_prefix("urn:ogc:def:crs:epsg:") {
            // version segment is usually empty ("EPSG::4326") but may be set
            rest.rsplit(':').next().unwrap_or(rest)
        } else if let Some(rest) = lower.strip_prefix("urn:x-ogc:def:crs:epsg:") {
            rest.rsplit(':').next().unwrap_or(rest)
        } else if let Some(rest) = lower.strip_prefix(&CRS_PREFIX.to_ascii_lowercase()) {
            rest
        } else if let Some(rest) = lower.strip_prefix("http://www.opengis.net/gml/srs/epsg.xml#") {
            rest
        } else {
            lower.as_str()
        };

        digits
            .parse::<u32>()
            .map(Self::from_epsg)
            .map_err(|_| GeomonError::UnknownCrs { code: trimmed.to_string() })
    }

    /// The OGC URI for this CRS
    pub fn uri(&self) -> String {
        format!("{}{}", CRS_PREFIX, self.epsg)
    }

    /// Two CRS refer to the same reference system
    pub fn matches(&self, other: &Crs) -> bool {
        self.epsg == other.epsg
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Axis-aligned bounding box with its reference system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub crs: Crs,
}

impl BoundingBox {
    /// Create a bounding box from two opposite corners given in any order
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, crs: Crs) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
            crs,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center of the box as `(x, y)`
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Geometry validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ValidityMode {
    /// Strict validation - reject any invalid geometries
    Strict,
    /// Lenient validation - hand geometries to the engine as parsed
    #[default]
    Lenient,
}

/// How spatial predicates chained by AND are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConjunctionMode {
    /// Every predicate in an AND chain is intersected into one region
    #[default]
    Intersect,
    /// Only predicates on the same attribute are intersected together
    PerAttribute,
}
