use crate::error::Result;
use crate::models::Crs;

/// Port for the geometry library doing the numerically sensitive work.
///
/// Regions and points stay opaque to callers; everything they need goes
/// through these operations.
pub trait GeometryEngine {
    /// A 2-D region tagged with its reference system
    type Region: Clone;

    /// A single position
    type Point;

    /// Parse WKT text into a region in the given CRS
    fn parse_wkt(&self, text: &str, crs: &Crs) -> Result<Self::Region>;

    /// Intersect two regions; fails when their reference systems differ
    fn intersection(&self, left: &Self::Region, right: &Self::Region) -> Result<Self::Region>;

    /// Centroid of a region, `None` when the region is empty
    fn centroid(&self, region: &Self::Region) -> Option<Self::Point>;

    /// Render a point as `POINT (<x> <y>)`, or `POINT EMPTY` for no point
    fn format_point(&self, point: Option<&Self::Point>) -> String;

    /// Rectangle from two opposite corners given in any order
    fn rectangle_from_bounds(&self, x1: f64, y1: f64, x2: f64, y2: f64, crs: &Crs)
        -> Self::Region;
}
