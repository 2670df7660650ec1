//! Centroid extraction from monitored requests

use geomon_core::config::{LayeredConfig, DEFAULT_FILTER_KEYS};
use geomon_core::models::{ConjunctionMode, Crs, RequestData};
use geomon_core::ports::GeometryEngine;
use geomon_core::Result;

use crate::parser::parse_filter;
use crate::query::locate_filter;
use crate::reduce::{reduce, ClauseGroup};

/// Settings for a [`CentroidExtractor`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorOptions {
    /// Query-string keys that carry a CQL filter
    pub filter_keys: Vec<String>,
    /// CRS of filter geometries that have no SRID of their own
    pub default_crs: Crs,
    pub conjunction: ConjunctionMode,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            filter_keys: DEFAULT_FILTER_KEYS.iter().map(|k| k.to_string()).collect(),
            default_crs: Crs::wgs84(),
            conjunction: ConjunctionMode::Intersect,
        }
    }
}

impl From<&LayeredConfig> for ExtractorOptions {
    fn from(config: &LayeredConfig) -> Self {
        Self {
            filter_keys: config.filter_keys.value.clone(),
            default_crs: config.default_crs(),
            conjunction: config.conjunction.value,
        }
    }
}

/// Extracts the centroids of the regions a request touched.
///
/// Stateless apart from its options; one extractor can serve any number of
/// requests, from any number of threads when the engine allows it.
#[derive(Debug, Clone)]
pub struct CentroidExtractor<E> {
    engine: E,
    options: ExtractorOptions,
}

impl<E: GeometryEngine> CentroidExtractor<E> {
    pub fn new(engine: E, options: ExtractorOptions) -> Self {
        Self { engine, options }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Centroid of the request's bounding box
    pub fn bbox_centroid(&self, request: &RequestData) -> Option<E::Point> {
        let bbox = request.bbox.as_ref()?;
        let region = self.engine.rectangle_from_bounds(
            bbox.min_x,
            bbox.min_y,
            bbox.max_x,
            bbox.max_y,
            &bbox.crs,
        );
        self.engine.centroid(&region)
    }

    /// Centroid of the request's bounding box as `POINT (x y)`
    pub fn bbox_centroid_wkt(&self, request: &RequestData) -> Option<String> {
        request.bbox.as_ref()?;
        Some(self.engine.format_point(self.bbox_centroid(request).as_ref()))
    }

    /// The irreducible regions referenced by the request's filter.
    ///
    /// A missing or unparseable filter yields no regions; only malformed
    /// geometry and CRS mismatches are errors.
    pub fn query_regions(&self, request: &RequestData) -> Result<Vec<ClauseGroup<E::Region>>> {
        let Some(query) = request.query_string.as_deref() else {
            return Ok(Vec::new());
        };

        let Some(filter) = locate_filter(query, &self.options.filter_keys) else {
            tracing::trace!("No filter parameter in query string");
            return Ok(Vec::new());
        };
        tracing::debug!(filter = %filter, "Located filter");

        let expr = match parse_filter(&filter) {
            Ok(expr) => expr,
            Err(e) => {
                tracing::debug!(error = %e, filter = %filter, "Ignoring unparseable filter");
                return Ok(Vec::new());
            }
        };

        let groups = reduce(&self.engine, &expr, &self.options.default_crs, self.options.conjunction)?;
        tracing::debug!(groups = groups.len(), "Reduced filter");
        Ok(groups)
    }

    /// Centroids of the filter regions, `None` for empty regions
    pub fn query_centroids(&self, request: &RequestData) -> Result<Vec<Option<E::Point>>> {
        Ok(self
            .query_regions(request)?
            .iter()
            .map(|group| self.engine.centroid(&group.region))
            .collect())
    }

    /// Centroids of the filter regions as `POINT (x y)` / `POINT EMPTY` text
    pub fn query_centroid_wkts(&self, request: &RequestData) -> Result<Vec<String>> {
        Ok(self
            .query_centroids(request)?
            .iter()
            .map(|point| self.engine.format_point(point.as_ref()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomon_core::config::CliConfigOverrides;
    use geomon_core::models::BoundingBox;
    use geomon_geo::GeoEngine;

    fn extractor() -> CentroidExtractor<GeoEngine> {
        CentroidExtractor::new(GeoEngine::default(), ExtractorOptions::default())
    }

    #[test]
    fn test_empty_request() {
        let request = RequestData::new();
        assert_eq!(extractor().bbox_centroid_wkt(&request), None);
        assert!(extractor().query_centroid_wkts(&request).unwrap().is_empty());
    }

    #[test]
    fn test_bbox_centroid() {
        let request = RequestData::new().with_bbox(BoundingBox::new(0.0, 0.0, 10.0, 5.0, Crs::wgs84()));
        assert_eq!(extractor().bbox_centroid_wkt(&request).as_deref(), Some("POINT (5 2.5)"));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            crs: Some(3857),
            conjunction: Some(ConjunctionMode::PerAttribute),
            ..Default::default()
        });

        let options = ExtractorOptions::from(&config);
        assert_eq!(options.default_crs.epsg, 3857);
        assert_eq!(options.conjunction, ConjunctionMode::PerAttribute);
        assert_eq!(options.filter_keys, vec!["CQL_FILTER", "FILTER"]);
    }

    #[test]
    fn test_default_crs_applies_to_filter_geometries() {
        let options = ExtractorOptions { default_crs: Crs::web_mercator(), ..Default::default() };
        let extractor = CentroidExtractor::new(GeoEngine::default(), options);
        let request = RequestData::new().with_query_string("CQL_FILTER=INTERSECTS(g, POINT(1 2))");

        let groups = extractor.query_regions(&request).unwrap();
        assert_eq!(groups[0].region.crs, Crs::web_mercator());
    }
}
