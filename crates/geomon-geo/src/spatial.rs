use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    BooleanOps, Contains, Geometry, GeometryCollection, Intersects, Line, LineString, MultiLineString,
    MultiPoint, MultiPolygon, Point, Rect,
};

/// Intersect two geometries expressed in the same reference system.
///
/// An areal operand lying inside the other comes back unchanged; other
/// areal pairs go through the `geo` boolean operations, which snap
/// coordinates to a grid. Points and lines are clipped against areas or each
/// other. An empty geometry collection stands for "no overlap".
pub fn intersect(left: &Geometry<f64>, right: &Geometry<f64>) -> Geometry<f64> {
    if let (Geometry::Rect(a), Geometry::Rect(b)) = (left, right) {
        return rect_intersection(a, b).map(Geometry::Rect).unwrap_or_else(empty);
    }

    match (areal(left), areal(right)) {
        (Some(a), Some(b)) => {
            if a.contains(&b) {
                right.clone()
            } else if b.contains(&a) {
                left.clone()
            } else {
                non_empty(Geometry::MultiPolygon(a.intersection(&b)))
            }
        }
        (Some(area), None) => clip_to_area(right, &area),
        (None, Some(area)) => clip_to_area(left, &area),
        (None, None) => intersect_non_areal(left, right),
    }
}

/// Overlap of two rectangles, `None` when they are disjoint
fn rect_intersection(a: &Rect<f64>, b: &Rect<f64>) -> Option<Rect<f64>> {
    let min_x = a.min().x.max(b.min().x);
    let min_y = a.min().y.max(b.min().y);
    let max_x = a.max().x.min(b.max().x);
    let max_y = a.max().y.min(b.max().y);

    if min_x > max_x || min_y > max_y {
        return None;
    }

    Some(Rect::new(geo::coord! { x: min_x, y: min_y }, geo::coord! { x: max_x, y: max_y }))
}

/// View a geometry as a multipolygon if it is two-dimensional
fn areal(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon::new(vec![t.to_polygon()])),
        Geometry::GeometryCollection(gc) if !gc.0.is_empty() => {
            // only collections made purely of areas count as areal
            let mut members = gc.0.iter().map(areal);
            let first = members.next()??;
            members.try_fold(first, |acc, member| member.map(|mp| acc.union(&mp)))
        }
        _ => None,
    }
}

/// Keep the parts of a point or line geometry that fall inside an area
fn clip_to_area(geometry: &Geometry<f64>, area: &MultiPolygon<f64>) -> Geometry<f64> {
    match geometry {
        Geometry::Point(p) => {
            if area.intersects(p) {
                Geometry::Point(*p)
            } else {
                empty()
            }
        }
        Geometry::MultiPoint(mp) => {
            let kept: Vec<Point<f64>> = mp.iter().filter(|p| area.intersects(*p)).copied().collect();
            non_empty(Geometry::MultiPoint(MultiPoint::new(kept)))
        }
        Geometry::Line(line) => clip_lines(area, MultiLineString::new(vec![LineString::from(*line)])),
        Geometry::LineString(ls) => clip_lines(area, MultiLineString::new(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => clip_lines(area, mls.clone()),
        Geometry::GeometryCollection(gc) => {
            let area = Geometry::MultiPolygon(area.clone());
            collect(gc.0.iter().map(|member| intersect(member, &area)))
        }
        // areal variants are handled by the caller
        _ => intersect(geometry, &Geometry::MultiPolygon(area.clone())),
    }
}

fn clip_lines(area: &MultiPolygon<f64>, lines: MultiLineString<f64>) -> Geometry<f64> {
    let clipped = area.clip(&lines, false);
    let clipped = MultiLineString::new(clipped.0.into_iter().filter(|ls| ls.0.len() > 1).collect());
    non_empty(Geometry::MultiLineString(clipped))
}

/// Intersection of two geometries of dimension zero or one
fn intersect_non_areal(left: &Geometry<f64>, right: &Geometry<f64>) -> Geometry<f64> {
    match (left, right) {
        (Geometry::GeometryCollection(gc), other) | (other, Geometry::GeometryCollection(gc)) => {
            collect(gc.0.iter().map(|member| intersect(member, other)))
        }
        (Geometry::Point(p), other) | (other, Geometry::Point(p)) => {
            if other.intersects(p) {
                Geometry::Point(*p)
            } else {
                empty()
            }
        }
        (Geometry::MultiPoint(mp), other) | (other, Geometry::MultiPoint(mp)) => {
            let kept: Vec<Point<f64>> =
                mp.iter().filter(|p| other.intersects(*p)).copied().collect();
            non_empty(Geometry::MultiPoint(MultiPoint::new(kept)))
        }
        _ => intersect_lines(&segments(left), &segments(right)),
    }
}

/// Break a lineal geometry into its segments
fn segments(geometry: &Geometry<f64>) -> Vec<Line<f64>> {
    match geometry {
        Geometry::Line(line) => vec![*line],
        Geometry::LineString(ls) => ls.lines().collect(),
        Geometry::MultiLineString(mls) => mls.iter().flat_map(|ls| ls.lines()).collect(),
        _ => Vec::new(),
    }
}

fn intersect_lines(left: &[Line<f64>], right: &[Line<f64>]) -> Geometry<f64> {
    let mut points = Vec::new();
    let mut overlaps = Vec::new();

    for a in left {
        for b in right {
            match line_intersection(*a, *b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    let point = Point::from(intersection);
                    if !points.contains(&point) {
                        points.push(point);
                    }
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    overlaps.push(LineString::from(intersection));
                }
                None => {}
            }
        }
    }

    let mut members = Vec::new();
    if !overlaps.is_empty() {
        members.push(Geometry::MultiLineString(MultiLineString::new(overlaps)));
    }
    if !points.is_empty() {
        members.push(Geometry::MultiPoint(MultiPoint::new(points)));
    }
    collect(members.into_iter())
}

/// Gather non-empty parts; a single part is returned unwrapped
fn collect(parts: impl Iterator<Item = Geometry<f64>>) -> Geometry<f64> {
    let mut parts: Vec<Geometry<f64>> =
        parts.filter(|g| !crate::models::is_empty_geometry(g)).collect();
    match parts.len() {
        0 => empty(),
        1 => parts.remove(0),
        _ => Geometry::GeometryCollection(GeometryCollection(parts)),
    }
}

fn non_empty(geometry: Geometry<f64>) -> Geometry<f64> {
    if crate::models::is_empty_geometry(&geometry) {
        empty()
    } else {
        geometry
    }
}

fn empty() -> Geometry<f64> {
    Geometry::GeometryCollection(GeometryCollection(Vec::new()))
}
