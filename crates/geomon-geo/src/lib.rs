//! Geomon Geo - Geometry engine adapter
//!
//! This crate implements the geometry engine port on top of the `geo` and
//! `wkt` crates: WKT parsing, region intersection, centroids and point text.

pub mod engine;
pub mod models;
pub mod spatial;
pub mod validation;

pub use engine::GeoEngine;
pub use models::Region;
