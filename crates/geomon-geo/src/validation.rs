use geo::Geometry;
use geomon_core::error::{GeomonError, Result};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Fold errors found inside a member geometry under a prefix
    fn absorb(&mut self, prefix: String, inner: ValidationResult) {
        for error in inner.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }

    /// Turn the first error into a `GeomonError`
    pub fn into_result(self) -> Result<()> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(error) => Err(GeomonError::InvalidGeometry {
                location: error.location,
                reason: error.reason,
            }),
        }
    }
}

/// Validate a geometry parsed from a filter
pub fn validate_geometry(geometry: &Geometry<f64>) -> ValidationResult {
    match geometry {
        Geometry::Point(p) => validate_point(p),
        Geometry::Line(line) => validate_linestring(&geo::LineString::from(*line)),
        Geometry::LineString(ls) => validate_linestring(ls),
        Geometry::Polygon(poly) => validate_polygon(poly),
        Geometry::MultiPoint(mp) => {
            let mut result = ValidationResult::valid();
            for (i, point) in mp.0.iter().enumerate() {
                result.absorb(format!("MultiPoint[{}]", i), validate_point(point));
            }
            result
        }
        Geometry::MultiLineString(mls) => {
            let mut result = ValidationResult::valid();
            for (i, linestring) in mls.0.iter().enumerate() {
                result.absorb(format!("MultiLineString[{}]", i), validate_linestring(linestring));
            }
            result
        }
        Geometry::MultiPolygon(mp) => {
            let mut result = ValidationResult::valid();
            for (i, polygon) in mp.0.iter().enumerate() {
                result.absorb(format!("MultiPolygon[{}]", i), validate_polygon(polygon));
            }
            result
        }
        Geometry::GeometryCollection(gc) => {
            let mut result = ValidationResult::valid();
            for (i, member) in gc.0.iter().enumerate() {
                result.absorb(format!("GeometryCollection[{}]", i), validate_geometry(member));
            }
            result
        }
        Geometry::Rect(rect) => {
            validate_polygon(&rect.to_polygon())
        }
        Geometry::Triangle(triangle) => validate_polygon(&triangle.to_polygon()),
    }
}

fn validate_point(point: &geo::Point<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if !point.x().is_finite() || !point.y().is_finite() {
        result.add_error(
            format!("Point({}, {})", point.x(), point.y()),
            "Coordinates must be finite".to_string(),
        );
    }
    result
}

fn validate_linestring(linestring: &geo::LineString<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if linestring.0.len() < 2 {
        result.add_error(
            "LineString".to_string(),
            format!("LineString must have at least 2 points, found {}", linestring.0.len()),
        );
        return result;
    }

    for (i, coord) in linestring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result
                .add_error(format!("LineString[{}]", i), "Coordinates must be finite".to_string());
        }
    }

    result
}

fn validate_ring(ring: &geo::LineString<f64>, location: String, result: &mut ValidationResult) {
    // geo closes rings on construction, so a triangle arrives with 4 points
    if ring.0.len() < 4 {
        result.add_error(
            location.clone(),
            format!("Ring must have at least 4 points, found {}", ring.0.len()),
        );
    }

    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        result.add_error(location, "Coordinates must be finite".to_string());
    }
}

fn validate_polygon(polygon: &geo::Polygon<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    validate_ring(polygon.exterior(), "Polygon exterior".to_string(), &mut result);

    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior, format!("Polygon interior[{}]", i), &mut result);
    }

    result
}
