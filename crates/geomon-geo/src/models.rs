//! Region model for geomon-geo.
//!
//! A region is a `geo` geometry tagged with the reference system its
//! coordinates are expressed in.

use geo::{Geometry, GeometryCollection, Rect};
use geomon_core::models::{BoundingBox, Crs};

/// A 2-D region in a known reference system
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub geometry: Geometry<f64>,
    pub crs: Crs,
}

impl Region {
    pub fn new(geometry: Geometry<f64>, crs: Crs) -> Self {
        Self { geometry, crs }
    }

    /// A region covering nothing
    pub fn empty(crs: Crs) -> Self {
        Self::new(Geometry::GeometryCollection(GeometryCollection(Vec::new())), crs)
    }

    /// Rectangle spanned by two opposite corners given in any order
    pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64, crs: Crs) -> Self {
        // Rect::new orders the corners itself
        let rect = Rect::new(geo::coord! { x: x1, y: y1 }, geo::coord! { x: x2, y: y2 });
        Self::new(Geometry::Rect(rect), crs)
    }

    /// Check whether the region covers no point at all
    pub fn is_empty(&self) -> bool {
        is_empty_geometry(&self.geometry)
    }
}

impl From<&BoundingBox> for Region {
    fn from(bbox: &BoundingBox) -> Self {
        Region::rectangle(bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y, bbox.crs.clone())
    }
}

/// Check whether a geometry has no coordinates
pub fn is_empty_geometry(geometry: &Geometry<f64>) -> bool {
    match geometry {
        Geometry::Point(_) | Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        Geometry::LineString(ls) => ls.0.is_empty(),
        Geometry::Polygon(p) => p.exterior().0.is_empty(),
        Geometry::MultiPoint(mp) => mp.0.is_empty(),
        Geometry::MultiLineString(mls) => mls.0.iter().all(|ls| ls.0.is_empty()),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_empty_geometry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_orders_corners() {
        let region = Region::rectangle(4.0, 3.0, 1.0, 1.0, Crs::wgs84());
        match region.geometry {
            Geometry::Rect(rect) => {
                assert_eq!(rect.min(), geo::coord! { x: 1.0, y: 1.0 });
                assert_eq!(rect.max(), geo::coord! { x: 4.0, y: 3.0 });
            }
            other => panic!("Expected Rect geometry, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_region() {
        assert!(Region::empty(Crs::wgs84()).is_empty());
        assert!(!Region::rectangle(0.0, 0.0, 1.0, 1.0, Crs::wgs84()).is_empty());
    }

    #[test]
    fn test_region_from_bounding_box() {
        let bbox = BoundingBox::new(-117.14, 37.09, -117.19, 37.03, Crs::web_mercator());
        let region = Region::from(&bbox);
        assert_eq!(region.crs, Crs::web_mercator());
        assert!(matches!(region.geometry, Geometry::Rect(_)));
    }
}
