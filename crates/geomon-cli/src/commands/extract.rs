//! Extract command implementation

use crate::cli::ExtractArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{ExtractOutput, RegionOutput};
use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use geomon_core::config::{
    parse_conjunction_mode, parse_filter_keys, parse_validity_mode, CliConfigOverrides,
};
use geomon_core::models::{BoundingBox, Crs, RequestData};
use geomon_core::ports::GeometryEngine;
use geomon_filter::{CentroidExtractor, ClauseGroup, ExtractorOptions};
use geomon_geo::{GeoEngine, Region};
use std::path::Path;
use tabled::Tabled;

type Point = <GeoEngine as GeometryEngine>::Point;

pub fn execute(args: ExtractArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let overrides = CliConfigOverrides {
        crs: args.crs.as_deref().map(Crs::parse).transpose()?.map(|crs| crs.epsg),
        conjunction: args.conjunction.as_deref().map(parse_conjunction_mode).transpose()?,
        geometry_validity: args.validity_mode.as_deref().map(parse_validity_mode).transpose()?,
        filter_keys: args.filter_keys.as_deref().map(parse_filter_keys).transpose()?,
    };
    let config = load_config_with_overrides(config_path, overrides)?;

    let extractor = CentroidExtractor::new(
        GeoEngine::new(config.geometry_validity.value),
        ExtractorOptions::from(&config),
    );
    let engine = extractor.engine();

    let mut request = RequestData::new();
    if let Some(query) = args.query {
        request = request.with_query_string(query);
    }
    if let Some([x1, y1, x2, y2]) = args.bbox {
        let crs = Crs::parse(&args.bbox_crs).context("Invalid --bbox-crs")?;
        request = request.with_bbox(BoundingBox::new(x1, y1, x2, y2, crs));
    }

    let bbox_centroid = extractor.bbox_centroid(&request);
    let groups = extractor
        .query_regions(&request)
        .context("Failed to extract filter regions")?;
    let centroids: Vec<Option<Point>> = groups.iter().map(|g| engine.centroid(&g.region)).collect();

    if args.geojson {
        return output.data(&feature_collection(bbox_centroid.as_ref(), &groups, &centroids));
    }

    let regions: Vec<RegionOutput> = groups
        .iter()
        .zip(&centroids)
        .map(|(group, centroid)| RegionOutput {
            attribute: group.attribute.clone(),
            clauses: group.clauses,
            offset: group.offset,
            centroid: engine.format_point(centroid.as_ref()),
        })
        .collect();
    let bbox_text = bbox_centroid.as_ref().map(|p| engine.format_point(Some(p)));

    if output.is_json() {
        output.result(ExtractOutput { bbox_centroid: bbox_text, regions })?;
    } else {
        output.section("Bounding Box");
        output.kv("Centroid", bbox_text.as_deref().unwrap_or("(no bbox)"));

        output.section("Filter Regions");
        if regions.is_empty() {
            output.info("No spatial regions in the filter");
        } else {
            #[derive(Tabled)]
            struct RegionRow {
                #[tabled(rename = "#")]
                index: usize,
                #[tabled(rename = "Attribute")]
                attribute: String,
                #[tabled(rename = "Clauses")]
                clauses: usize,
                #[tabled(rename = "Centroid")]
                centroid: String,
            }

            let rows: Vec<RegionRow> = regions
                .into_iter()
                .enumerate()
                .map(|(i, region)| RegionRow {
                    index: i + 1,
                    attribute: region.attribute,
                    clauses: region.clauses,
                    centroid: region.centroid,
                })
                .collect();

            output.table(rows);
        }
    }

    Ok(())
}

fn feature_collection(
    bbox_centroid: Option<&Point>,
    groups: &[ClauseGroup<Region>],
    centroids: &[Option<Point>],
) -> FeatureCollection {
    let mut features = Vec::new();

    if let Some(point) = bbox_centroid {
        let mut properties = JsonObject::new();
        properties.insert("source".to_string(), "bbox".into());
        features.push(point_feature(Some(point), properties));
    }

    for (group, centroid) in groups.iter().zip(centroids) {
        let mut properties = JsonObject::new();
        properties.insert("source".to_string(), "filter".into());
        properties.insert("attribute".to_string(), group.attribute.clone().into());
        properties.insert("clauses".to_string(), group.clauses.into());
        features.push(point_feature(centroid.as_ref(), properties));
    }

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// A point feature; empty regions get a null geometry
fn point_feature(point: Option<&Point>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: point.map(|p| Geometry::new(Value::Point(vec![p.x(), p.y()]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
