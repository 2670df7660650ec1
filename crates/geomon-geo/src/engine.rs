//! `geo`/`wkt` backed implementation of the geometry engine port

use geo::{Centroid, Geometry, Point};
use geomon_core::error::{GeomonError, Result};
use geomon_core::models::{Crs, ValidityMode};
use geomon_core::ports::GeometryEngine;
use wkt::TryFromWkt;

use crate::models::Region;
use crate::spatial;
use crate::validation::validate_geometry;

/// Geometry engine over the `geo` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine {
    validity: ValidityMode,
}

impl GeoEngine {
    pub fn new(validity: ValidityMode) -> Self {
        Self { validity }
    }

    pub fn validity(&self) -> ValidityMode {
        self.validity
    }
}

impl GeometryEngine for GeoEngine {
    type Region = Region;
    type Point = Point<f64>;

    /// Parse WKT, honouring an EWKT `SRID=n;` prefix over `crs`
    fn parse_wkt(&self, text: &str, crs: &Crs) -> Result<Region> {
        let (crs, body) = split_srid(text, crs)?;

        let geometry = Geometry::<f64>::try_from_wkt_str(body).map_err(|e| {
            GeomonError::InvalidWkt { wkt: text.to_string(), reason: e.to_string() }
        })?;

        if self.validity == ValidityMode::Strict {
            validate_geometry(&geometry).into_result()?;
        }

        Ok(Region::new(geometry, crs))
    }

    fn intersection(&self, left: &Region, right: &Region) -> Result<Region> {
        if !left.crs.matches(&right.crs) {
            return Err(GeomonError::CrsMismatch {
                left: left.crs.to_string(),
                right: right.crs.to_string(),
            });
        }

        let region = Region::new(spatial::intersect(&left.geometry, &right.geometry), left.crs.clone());
        if region.is_empty() {
            tracing::debug!(crs = %region.crs, "Intersection is empty");
        }

        Ok(region)
    }

    fn centroid(&self, region: &Region) -> Option<Point<f64>> {
        match &region.geometry {
            // midpoint of the corners, not an area-weighted average
            Geometry::Rect(rect) => Some(Point::new(
                (rect.min().x + rect.max().x) / 2.0,
                (rect.min().y + rect.max().y) / 2.0,
            )),
            geometry => geometry.centroid(),
        }
    }

    fn format_point(&self, point: Option<&Point<f64>>) -> String {
        match point {
            Some(p) => format!("POINT ({} {})", p.x(), p.y()),
            None => "POINT EMPTY".to_string(),
        }
    }

    fn rectangle_from_bounds(&self, x1: f64, y1: f64, x2: f64, y2: f64, crs: &Crs) -> Region {
        Region::rectangle(x1, y1, x2, y2, crs.clone())
    }
}

/// Split an optional `SRID=n;` prefix off WKT text
fn split_srid<'a>(text: &'a str, default: &Crs) -> Result<(Crs, &'a str)> {
    let trimmed = text.trim();
    let has_srid = trimmed.get(..5).is_some_and(|prefix| prefix.eq_ignore_ascii_case("SRID="));

    if !has_srid {
        return Ok((default.clone(), trimmed));
    }

    match trimmed[5..].split_once(';') {
        Some((code, body)) => Ok((Crs::parse(code)?, body.trim())),
        None => Err(GeomonError::InvalidWkt {
            wkt: text.to_string(),
            reason: "SRID prefix is not followed by ';'".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const POLYGON_1: &str = "POLYGON ((120 35, 120 40, 115 40, 115 35, 120 35))";
    const POLYGON_2: &str = "POLYGON ((117 37, 117 38, 116 38, 116 37, 117 37))";

    fn engine() -> GeoEngine {
        GeoEngine::default()
    }

    fn centroid_text(region: &Region) -> String {
        let engine = engine();
        engine.format_point(engine.centroid(region).as_ref())
    }

    #[test]
    fn test_parse_polygon_centroid() {
        let region = engine().parse_wkt(POLYGON_1, &Crs::wgs84()).unwrap();
        assert_eq!(region.crs, Crs::wgs84());
        assert_eq!(centroid_text(&region), "POINT (117.5 37.5)");
    }

    #[test]
    fn test_parse_without_spaces() {
        let region = engine()
            .parse_wkt("POLYGON((1 1,4 1,4 3,1 3,1 1))", &Crs::wgs84())
            .unwrap();
        assert_eq!(centroid_text(&region), "POINT (2.5 2)");
    }

    #[test]
    fn test_parse_ewkt_srid() {
        let region = engine().parse_wkt("SRID=3857;POINT (10 20)", &Crs::wgs84()).unwrap();
        assert_eq!(region.crs.epsg, 3857);
        assert_eq!(centroid_text(&region), "POINT (10 20)");
    }

    #[test]
    fn test_malformed_wkt() {
        let err = engine().parse_wkt("POLYGON ((1 1, 2 2", &Crs::wgs84()).unwrap_err();
        assert!(matches!(err, GeomonError::InvalidWkt { .. }));
    }

    #[test]
    fn test_srid_without_separator() {
        let err = engine().parse_wkt("SRID=4326 POINT (1 1)", &Crs::wgs84()).unwrap_err();
        assert!(matches!(err, GeomonError::InvalidWkt { .. }));
    }

    #[test]
    fn test_strict_mode_rejects_degenerate_ring() {
        let wkt = "POLYGON ((0 0, 1 0, 0 0))";
        assert!(GeoEngine::new(ValidityMode::Lenient).parse_wkt(wkt, &Crs::wgs84()).is_ok());

        let err = GeoEngine::new(ValidityMode::Strict).parse_wkt(wkt, &Crs::wgs84()).unwrap_err();
        assert!(matches!(err, GeomonError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_nested_polygon_intersection() {
        let engine = engine();
        let a = engine.parse_wkt(POLYGON_1, &Crs::wgs84()).unwrap();
        let b = engine.parse_wkt(POLYGON_2, &Crs::wgs84()).unwrap();
        let both = engine.intersection(&a, &b).unwrap();
        assert_eq!(centroid_text(&both), "POINT (116.5 37.5)");
    }

    #[test]
    fn test_intersection_crs_mismatch() {
        let engine = engine();
        let a = engine.parse_wkt(POLYGON_1, &Crs::wgs84()).unwrap();
        let b = engine.parse_wkt(POLYGON_2, &Crs::web_mercator()).unwrap();
        let err = engine.intersection(&a, &b).unwrap_err();
        assert!(matches!(err, GeomonError::CrsMismatch { .. }));
    }

    #[test]
    fn test_disjoint_intersection_formats_empty() {
        let engine = engine();
        let a = engine.rectangle_from_bounds(0.0, 0.0, 1.0, 1.0, &Crs::wgs84());
        let b = engine.rectangle_from_bounds(5.0, 5.0, 6.0, 6.0, &Crs::wgs84());
        let none = engine.intersection(&a, &b).unwrap();
        assert!(none.is_empty());
        assert_eq!(centroid_text(&none), "POINT EMPTY");
    }

    #[test]
    fn test_rectangle_centroid_is_exact_midpoint() {
        let region = engine().rectangle_from_bounds(
            -117.14141615693983,
            37.034726090346105,
            -117.19950166515697,
            37.09281159856325,
            &Crs::wgs84(),
        );
        assert_eq!(centroid_text(&region), "POINT (-117.1704589110484 37.06376884445468)");
    }

    #[test]
    fn test_format_point() {
        let engine = engine();
        assert_eq!(engine.format_point(Some(&Point::new(2.5, 2.0))), "POINT (2.5 2)");
        assert_eq!(engine.format_point(Some(&Point::new(-0.5, 1e-3))), "POINT (-0.5 0.001)");
        assert_eq!(engine.format_point(None), "POINT EMPTY");
    }

    proptest! {
        #[test]
        fn prop_rectangle_centroid_is_corner_midpoint(
            x1 in -180.0f64..180.0,
            y1 in -90.0f64..90.0,
            x2 in -180.0f64..180.0,
            y2 in -90.0f64..90.0,
        ) {
            let engine = engine();
            let forward = engine.rectangle_from_bounds(x1, y1, x2, y2, &Crs::wgs84());
            let backward = engine.rectangle_from_bounds(x2, y2, x1, y1, &Crs::wgs84());
            let c1 = engine.centroid(&forward).unwrap();
            let c2 = engine.centroid(&backward).unwrap();

            prop_assert_eq!(c1, c2);
            prop_assert!((c1.x() - (x1 + x2) / 2.0).abs() < 1e-9);
            prop_assert!((c1.y() - (y1 + y2) / 2.0).abs() < 1e-9);
        }
    }
}
