//! Geomon Filter - CQL filter analysis for centroid extraction
//!
//! Locates the filter inside a query string, tokenizes and parses it, reduces
//! its boolean structure to regions and hands those to the geometry engine
//! for centroids.

pub mod ast;
pub mod error;
pub mod extractor;
pub mod lex;
pub mod parser;
pub mod query;
pub mod reduce;

pub use ast::{Expr, GeometryOperand, SpatialClause, SpatialOperator};
pub use error::FilterError;
pub use extractor::{CentroidExtractor, ExtractorOptions};
pub use parser::parse_filter;
pub use query::locate_filter;
pub use reduce::{reduce, ClauseGroup};
