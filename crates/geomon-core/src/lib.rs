//! Geomon Core - Domain models, configuration, and the geometry engine port
//!
//! This crate contains the request model, CRS handling and the port trait that
//! geometry adapters implement for the centroid extractor.

pub mod config;
pub mod crs;
pub mod error;
pub mod models;
pub mod ports;

pub use error::{GeomonError, Result};
