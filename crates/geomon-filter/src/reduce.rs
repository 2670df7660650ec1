//! Reduction of the boolean structure of a filter into clause groups.
//!
//! Spatial clauses joined by AND are intersected into one region; clauses
//! joined by OR stay separate. Negated and non-spatial terms contribute
//! nothing.

use geomon_core::models::{ConjunctionMode, Crs};
use geomon_core::ports::GeometryEngine;
use geomon_core::Result;

use crate::ast::{Expr, GeometryOperand, SpatialClause};

/// Spatial clauses combined under one AND context, reduced to a single region
#[derive(Debug, Clone)]
pub struct ClauseGroup<R> {
    /// Attribute of the first clause in the group
    pub attribute: String,
    pub region: R,
    /// Byte offset of the earliest clause
    pub offset: usize,
    /// Number of clauses intersected into `region`
    pub clauses: usize,
}

/// Groups produced by one subtree
struct Reduction<R> {
    /// Groups still open to intersection with AND siblings
    chain: Vec<ClauseGroup<R>>,
    /// Groups sealed off by an OR
    independent: Vec<ClauseGroup<R>>,
}

impl<R> Reduction<R> {
    fn empty() -> Self {
        Self { chain: Vec::new(), independent: Vec::new() }
    }
}

/// Reduce a parsed filter to its irreducible regions, ordered by the first
/// appearance of each group's earliest clause.
///
/// Geometry literals are parsed in `default_crs` unless they carry their own
/// SRID. Malformed literals and CRS mismatches inside an AND chain are
/// errors.
pub fn reduce<E: GeometryEngine>(
    engine: &E,
    expr: &Expr,
    default_crs: &Crs,
    mode: ConjunctionMode,
) -> Result<Vec<ClauseGroup<E::Region>>> {
    let reducer = Reducer { engine, default_crs, mode };
    let reduction = reducer.reduce(expr)?;

    let mut groups = reduction.chain;
    groups.extend(reduction.independent);
    groups.sort_by_key(|group| group.offset);
    Ok(groups)
}

struct Reducer<'a, E> {
    engine: &'a E,
    default_crs: &'a Crs,
    mode: ConjunctionMode,
}

impl<'a, E: GeometryEngine> Reducer<'a, E> {
    fn reduce(&self, expr: &Expr) -> Result<Reduction<E::Region>> {
        match expr {
            Expr::Spatial(clause) => {
                let group = self.clause_group(clause)?;
                Ok(Reduction { chain: vec![group], independent: Vec::new() })
            }
            Expr::And(children) => {
                let mut result = Reduction::empty();
                for child in children {
                    let reduced = self.reduce(child)?;
                    for group in reduced.chain {
                        self.merge(&mut result.chain, group)?;
                    }
                    result.independent.extend(reduced.independent);
                }
                Ok(result)
            }
            Expr::Or(children) => {
                let mut result = Reduction::empty();
                for child in children {
                    let reduced = self.reduce(child)?;
                    result.independent.extend(reduced.chain);
                    result.independent.extend(reduced.independent);
                }
                Ok(result)
            }
            Expr::Not(_) | Expr::Include | Expr::Exclude | Expr::Other => Ok(Reduction::empty()),
        }
    }

    fn clause_group(&self, clause: &SpatialClause) -> Result<ClauseGroup<E::Region>> {
        let region = match &clause.operand {
            GeometryOperand::Wkt(text) => self.engine.parse_wkt(text, self.default_crs)?,
            GeometryOperand::Bounds { x1, y1, x2, y2, crs } => {
                let crs = match crs {
                    Some(code) => Crs::parse(code)?,
                    None => self.default_crs.clone(),
                };
                self.engine.rectangle_from_bounds(*x1, *y1, *x2, *y2, &crs)
            }
        };

        tracing::trace!(
            operator = %clause.operator,
            attribute = %clause.attribute,
            offset = clause.offset,
            "Spatial clause"
        );

        Ok(ClauseGroup {
            attribute: clause.attribute.clone(),
            region,
            offset: clause.offset,
            clauses: 1,
        })
    }

    /// Intersect `group` into the chain group it conjoins with, or open a new one
    fn merge(
        &self,
        chain: &mut Vec<ClauseGroup<E::Region>>,
        group: ClauseGroup<E::Region>,
    ) -> Result<()> {
        let target = match self.mode {
            ConjunctionMode::Intersect => chain.first_mut(),
            ConjunctionMode::PerAttribute => {
                chain.iter_mut().find(|existing| existing.attribute == group.attribute)
            }
        };

        match target {
            Some(existing) => {
                existing.region = self.engine.intersection(&existing.region, &group.region)?;
                existing.offset = existing.offset.min(group.offset);
                existing.clauses += group.clauses;
            }
            None => chain.push(group),
        }

        Ok(())
    }
}
