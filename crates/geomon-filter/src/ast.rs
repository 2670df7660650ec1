//! Expression tree built by the filter parser

use std::fmt;

/// Spatial predicates whose geometry operand marks a region of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialOperator {
    Intersects,
    Within,
    Contains,
    Overlaps,
    Crosses,
    Touches,
    Equals,
    BBox,
}

impl SpatialOperator {
    /// Look up a predicate by name, ignoring ASCII case
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name.to_ascii_uppercase().as_str() {
            "INTERSECTS" => Self::Intersects,
            "WITHIN" => Self::Within,
            "CONTAINS" => Self::Contains,
            "OVERLAPS" => Self::Overlaps,
            "CROSSES" => Self::Crosses,
            "TOUCHES" => Self::Touches,
            "EQUALS" => Self::Equals,
            "BBOX" => Self::BBox,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Intersects => "INTERSECTS",
            Self::Within => "WITHIN",
            Self::Contains => "CONTAINS",
            Self::Overlaps => "OVERLAPS",
            Self::Crosses => "CROSSES",
            Self::Touches => "TOUCHES",
            Self::Equals => "EQUALS",
            Self::BBox => "BBOX",
        }
    }
}

impl fmt::Display for SpatialOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The geometry side of a spatial predicate
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryOperand {
    /// WKT literal exactly as written, including any `SRID=n;` prefix
    Wkt(String),
    /// `BBOX` corners with an optional CRS identifier
    Bounds { x1: f64, y1: f64, x2: f64, y2: f64, crs: Option<String> },
}

/// One spatial predicate occurrence in the filter
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialClause {
    pub operator: SpatialOperator,
    pub attribute: String,
    pub operand: GeometryOperand,
    /// Byte offset of the predicate name in the filter text
    pub offset: usize,
}

/// Parsed filter
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Spatial(SpatialClause),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
    Include,
    Exclude,
    /// Any non-spatial term; contributes no region
    Other,
}

impl Expr {
    /// All spatial clauses in source order, whatever their context
    pub fn spatial_clauses(&self) -> Vec<&SpatialClause> {
        let mut clauses = Vec::new();
        self.collect_clauses(&mut clauses);
        clauses
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a SpatialClause>) {
        match self {
            Expr::Spatial(clause) => out.push(clause),
            Expr::And(children) | Expr::Or(children) => {
                children.iter().for_each(|child| child.collect_clauses(out))
            }
            Expr::Not(child) => child.collect_clauses(out),
            Expr::Include | Expr::Exclude | Expr::Other => {}
        }
    }
}
