//! Recursive-descent parser for CQL/ECQL filters.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, primary. Only the spatial
//! predicates are understood in detail; every other term is skipped as an
//! opaque [`Expr::Other`] as long as its parentheses balance.

use crate::ast::{Expr, GeometryOperand, SpatialClause, SpatialOperator};
use crate::error::{FilterError, Result};
use crate::lex::{tokenize, Token, TokenKind};

const GEOMETRY_KEYWORDS: [&str; 7] = [
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// Deepest nesting of parentheses and `NOT` accepted in one filter
pub const MAX_NESTING: usize = 128;

/// Parse a decoded filter value into an expression tree
pub fn parse_filter(source: &str) -> Result<Expr> {
    let tokens = tokenize(source)?;
    if tokens.len() == 1 {
        return Err(FilterError::Empty);
    }

    let mut parser = Parser { source, tokens, pos: 0, depth: 0 };
    let expr = parser.parse_or()?;

    if !parser.peek().is_eof() {
        return Err(parser.unexpected("AND, OR or end of filter"));
    }

    Ok(expr)
}

/// One argument of a binary spatial predicate
enum Operand {
    Attribute(String),
    Geometry(String),
    Other,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses and `NOT`s around the current position
    depth: usize,
}

impl<'a> Parser<'a> {
    // the token list always ends with Eof, and pos never moves past it
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    /// End offset of the last consumed token
    fn last_end(&self) -> usize {
        self.pos.checked_sub(1).map(|i| self.tokens[i].end).unwrap_or(0)
    }

    fn unexpected(&self, expected: &str) -> FilterError {
        let token = self.peek();
        FilterError::UnexpectedToken {
            expected: expected.to_string(),
            found: token.kind.describe(),
            offset: token.start,
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn descend(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FilterError::TooDeep { limit: MAX_NESTING, offset });
        }
        Ok(())
    }

    /// Whether the current token closes the term being parsed
    fn at_term_end(&self) -> bool {
        let token = self.peek();
        matches!(
            token.kind,
            TokenKind::Eof | TokenKind::RParen | TokenKind::Comma | TokenKind::Semicolon
        ) || token.is_keyword("AND")
            || token.is_keyword("OR")
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut children = vec![self.parse_and()?];
        while self.peek().is_keyword("OR") {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(if children.len() == 1 { children.remove(0) } else { Expr::Or(children) })
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut children = vec![self.parse_unary()?];
        while self.peek().is_keyword("AND") {
            self.advance();
            children.push(self.parse_unary()?);
        }
        Ok(if children.len() == 1 { children.remove(0) } else { Expr::And(children) })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.peek().is_keyword("NOT") {
            let not = self.advance();
            self.descend(not.start)?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.peek().clone();

        let expr = match &token.kind {
            TokenKind::LParen => {
                self.advance();
                self.descend(token.start)?;
                let inner = self.parse_or()?;
                self.expect(TokenKind::RParen, "')'")?;
                self.depth -= 1;
                inner
            }
            TokenKind::Ident(name) => {
                let operator = SpatialOperator::from_name(name)
                    .filter(|_| self.peek_at(1).kind == TokenKind::LParen);

                if let Some(operator) = operator {
                    self.parse_spatial(operator, token.start)?
                } else if token.is_keyword("INCLUDE") {
                    self.advance();
                    Expr::Include
                } else if token.is_keyword("EXCLUDE") {
                    self.advance();
                    Expr::Exclude
                } else {
                    return self.parse_opaque();
                }
            }
            _ => return self.parse_opaque(),
        };

        // `(a + b) > 3`, `INTERSECTS(..) = false`: the term goes on, so it is opaque
        if self.at_term_end() {
            Ok(expr)
        } else {
            self.skip_opaque()?;
            Ok(Expr::Other)
        }
    }

    fn parse_opaque(&mut self) -> Result<Expr> {
        if self.at_term_end() {
            return Err(self.unexpected("a filter term"));
        }
        self.skip_opaque()?;
        Ok(Expr::Other)
    }

    /// Consume tokens up to the end of the current term
    fn skip_opaque(&mut self) -> Result<()> {
        while !self.at_term_end() {
            let token = self.advance();
            match token.kind {
                TokenKind::LParen => self.skip_group()?,
                // the AND inside BETWEEN .. AND .. belongs to the term
                _ if token.is_keyword("BETWEEN") => {
                    while !self.peek().is_keyword("AND") {
                        if self.at_term_end() {
                            return Err(self.unexpected("AND"));
                        }
                        if self.advance().kind == TokenKind::LParen {
                            self.skip_group()?;
                        }
                    }
                    self.advance();
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Skip to the `)` matching an already consumed `(`
    fn skip_group(&mut self) -> Result<()> {
        let mut depth = 1usize;
        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => return Err(self.unexpected("')'")),
                TokenKind::LParen => {
                    depth += 1;
                    if self.depth + depth > MAX_NESTING {
                        return Err(FilterError::TooDeep { limit: MAX_NESTING, offset: token.start });
                    }
                }
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_spatial(&mut self, operator: SpatialOperator, offset: usize) -> Result<Expr> {
        self.advance();
        self.expect(TokenKind::LParen, "'('")?;

        if operator == SpatialOperator::BBox {
            return self.parse_bbox(offset);
        }

        let first = self.parse_operand()?;
        self.expect(TokenKind::Comma, "','")?;
        let second = self.parse_operand()?;
        self.expect(TokenKind::RParen, "')'")?;

        match (first, second) {
            (Operand::Attribute(attribute), Operand::Geometry(wkt))
            | (Operand::Geometry(wkt), Operand::Attribute(attribute)) => {
                Ok(Expr::Spatial(SpatialClause {
                    operator,
                    attribute,
                    operand: GeometryOperand::Wkt(wkt),
                    offset,
                }))
            }
            // two attributes, two literals or computed operands: no region to report
            _ => Ok(Expr::Other),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        let token = self.peek().clone();

        match &token.kind {
            TokenKind::Ident(name) if is_geometry_start(name, self.peek_at(1)) => {
                self.parse_wkt_literal().map(Operand::Geometry)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if self.peek().kind == TokenKind::LParen {
                    // function call such as buffer(the_geom, 10)
                    self.advance();
                    self.skip_group()?;
                    Ok(Operand::Other)
                } else {
                    Ok(Operand::Attribute(name.clone()))
                }
            }
            TokenKind::QuotedIdent(name) => {
                self.advance();
                Ok(Operand::Attribute(name.clone()))
            }
            TokenKind::Comma | TokenKind::RParen | TokenKind::Eof => {
                Err(self.unexpected("a predicate argument"))
            }
            _ => {
                while !matches!(
                    self.peek().kind,
                    TokenKind::Comma | TokenKind::RParen | TokenKind::Eof
                ) {
                    if self.advance().kind == TokenKind::LParen {
                        self.skip_group()?;
                    }
                }
                Ok(Operand::Other)
            }
        }
    }

    /// Capture a WKT literal as raw source text
    fn parse_wkt_literal(&mut self) -> Result<String> {
        let start = self.peek().start;

        if self.peek().is_keyword("SRID") {
            self.advance();
            if !matches!(&self.peek().kind, TokenKind::Operator(op) if op == "=") {
                return Err(self.unexpected("'='"));
            }
            self.advance();
            if !matches!(self.peek().kind, TokenKind::Number(_)) {
                return Err(self.unexpected("an SRID number"));
            }
            self.advance();
            self.expect(TokenKind::Semicolon, "';'")?;
        }

        if !GEOMETRY_KEYWORDS.iter().any(|k| self.peek().is_keyword(k)) {
            return Err(self.unexpected("a WKT geometry type"));
        }
        self.advance();

        if ["Z", "M", "ZM"].iter().any(|k| self.peek().is_keyword(k)) {
            self.advance();
        }

        if self.peek().is_keyword("EMPTY") {
            self.advance();
        } else {
            self.expect(TokenKind::LParen, "'('")?;
            self.skip_group()?;
        }

        Ok(self.source[start..self.last_end()].to_string())
    }

    fn parse_bbox(&mut self, offset: usize) -> Result<Expr> {
        let attribute = match self.peek().kind.clone() {
            TokenKind::Ident(name) | TokenKind::QuotedIdent(name) => {
                self.advance();
                name
            }
            _ => return Err(self.unexpected("an attribute name")),
        };

        let mut bounds = [0.0f64; 4];
        for bound in bounds.iter_mut() {
            self.expect(TokenKind::Comma, "','")?;
            *bound = self.parse_number()?;
        }

        let crs = if self.peek().kind == TokenKind::Comma {
            self.advance();
            match self.peek().kind.clone() {
                TokenKind::String(code) | TokenKind::Ident(code) => {
                    self.advance();
                    Some(code)
                }
                _ => return Err(self.unexpected("a CRS identifier")),
            }
        } else {
            None
        };

        self.expect(TokenKind::RParen, "')'")?;

        let [x1, y1, x2, y2] = bounds;
        Ok(Expr::Spatial(SpatialClause {
            operator: SpatialOperator::BBox,
            attribute,
            operand: GeometryOperand::Bounds { x1, y1, x2, y2, crs },
            offset,
        }))
    }

    /// A number, allowing a detached leading minus (`- 5`)
    fn parse_number(&mut self) -> Result<f64> {
        let negate = matches!(&self.peek().kind, TokenKind::Operator(op) if op == "-")
            && matches!(self.peek_at(1).kind, TokenKind::Number(_));
        if negate {
            self.advance();
        }

        match self.peek().kind.clone() {
            TokenKind::Number(n) => {
                self.advance();
                Ok(if negate { -n } else { n })
            }
            _ => Err(self.unexpected("a number")),
        }
    }
}

fn is_geometry_start(name: &str, next: &Token) -> bool {
    if name.eq_ignore_ascii_case("SRID") {
        return matches!(&next.kind, TokenKind::Operator(op) if op == "=");
    }
    GEOMETRY_KEYWORDS.iter().any(|k| name.eq_ignore_ascii_case(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLYGON_1: &str = "POLYGON((120 35,120 40,115 40,115 35,120 35))";

    fn clause(expr: &Expr) -> &SpatialClause {
        match expr {
            Expr::Spatial(clause) => clause,
            other => panic!("Expected spatial clause, got {:?}", other),
        }
    }

    fn wkt(clause: &SpatialClause) -> &str {
        match &clause.operand {
            GeometryOperand::Wkt(text) => text,
            other => panic!("Expected WKT operand, got {:?}", other),
        }
    }

    #[test]
    fn test_single_intersects() {
        let filter = format!("INTERSECTS(attr1, {})", POLYGON_1);
        let expr = parse_filter(&filter).unwrap();
        let clause = clause(&expr);

        assert_eq!(clause.operator, SpatialOperator::Intersects);
        assert_eq!(clause.attribute, "attr1");
        assert_eq!(wkt(clause), POLYGON_1);
        assert_eq!(clause.offset, 0);
    }

    #[test]
    fn test_geometry_first_argument_order() {
        let expr = parse_filter("within(POINT (1 2), \"the geom\")").unwrap();
        let clause = clause(&expr);
        assert_eq!(clause.operator, SpatialOperator::Within);
        assert_eq!(clause.attribute, "the geom");
        assert_eq!(wkt(clause), "POINT (1 2)");
    }

    #[test]
    fn test_ewkt_literal_keeps_srid_prefix() {
        let expr = parse_filter("INTERSECTS(geom, SRID=3857;POINT(10 20))").unwrap();
        assert_eq!(wkt(clause(&expr)), "SRID=3857;POINT(10 20)");
    }

    #[test]
    fn test_empty_geometry_literal() {
        let expr = parse_filter("INTERSECTS(geom, POINT EMPTY)").unwrap();
        assert_eq!(wkt(clause(&expr)), "POINT EMPTY");
    }

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let filter = "INTERSECTS(a, POINT(1 1)) OR INTERSECTS(b, POINT(2 2)) AND INTERSECTS(c, POINT(3 3))";
        match parse_filter(filter).unwrap() {
            Expr::Or(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], Expr::Spatial(_)));
                assert!(matches!(&children[1], Expr::And(inner) if inner.len() == 2));
            }
            other => panic!("Expected OR, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_or_inside_and() {
        let filter = "(INTERSECTS(a, POINT(1 1)) OR INTERSECTS(a, POINT(2 2))) and name = 'x'";
        match parse_filter(filter).unwrap() {
            Expr::And(children) => {
                assert!(matches!(&children[0], Expr::Or(inner) if inner.len() == 2));
                assert_eq!(children[1], Expr::Other);
            }
            other => panic!("Expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_clause_offsets() {
        let filter = "a = 1 AND INTERSECTS(g, POINT(0 0))";
        let expr = parse_filter(filter).unwrap();
        let clauses = expr.spatial_clauses();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].offset, 10);
    }

    #[test]
    fn test_bbox() {
        let expr = parse_filter("BBOX(the_geom, -10, 5.5, 10, - 5, 'EPSG:3857')").unwrap();
        let clause = clause(&expr);
        assert_eq!(clause.operator, SpatialOperator::BBox);
        assert_eq!(clause.attribute, "the_geom");
        assert_eq!(
            clause.operand,
            GeometryOperand::Bounds {
                x1: -10.0,
                y1: 5.5,
                x2: 10.0,
                y2: -5.0,
                crs: Some("EPSG:3857".to_string()),
            }
        );
    }

    #[test]
    fn test_bbox_missing_bound() {
        assert!(parse_filter("BBOX(the_geom, 1, 2, 3)").is_err());
    }

    #[test]
    fn test_not_wraps_predicate() {
        let expr = parse_filter("NOT INTERSECTS(a, POINT(1 1))").unwrap();
        assert!(matches!(expr, Expr::Not(inner) if matches!(*inner, Expr::Spatial(_))));
    }

    #[test]
    fn test_include_and_exclude() {
        assert_eq!(parse_filter("INCLUDE").unwrap(), Expr::Include);
        assert_eq!(parse_filter("exclude").unwrap(), Expr::Exclude);
    }

    #[test]
    fn test_opaque_terms() {
        let filters = [
            "name LIKE 'Ba%'",
            "population > 1000000",
            "depth BETWEEN 10 AND 20",
            "state IN ('NY', 'CA')",
            "notes IS NOT NULL",
            "strToLowerCase(name) = 'x'",
            "time DURING 2020-01-01T00:00:00Z/2020-12-31T00:00:00Z",
            "(a + b) * 2 > 3",
        ];
        for filter in filters {
            assert_eq!(parse_filter(filter).unwrap(), Expr::Other, "filter: {}", filter);
        }
    }

    #[test]
    fn test_between_does_not_split_conjunction() {
        let filter = "depth BETWEEN 1 AND 2 AND INTERSECTS(g, POINT(0 0))";
        match parse_filter(filter).unwrap() {
            Expr::And(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(children[0], Expr::Other);
                assert!(matches!(children[1], Expr::Spatial(_)));
            }
            other => panic!("Expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_spatial_name_used_as_attribute() {
        assert_eq!(parse_filter("contains = 'x'").unwrap(), Expr::Other);
    }

    #[test]
    fn test_attribute_against_attribute() {
        assert_eq!(parse_filter("INTERSECTS(a, b)").unwrap(), Expr::Other);
    }

    #[test]
    fn test_computed_geometry_operand() {
        assert_eq!(parse_filter("INTERSECTS(a, buffer(b, 10))").unwrap(), Expr::Other);
    }

    #[test]
    fn test_trailing_parameters_are_a_syntax_error() {
        let filter = format!("INTERSECTS(attr1, {});service=WFS;srsName=EPSG:4326", POLYGON_1);
        let err = parse_filter(&filter).unwrap_err();
        assert!(matches!(err, FilterError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert!(parse_filter("INTERSECTS(a, POLYGON((1 1, 2 2, 1 1))").is_err());
        assert!(parse_filter("(INTERSECTS(a, POINT(1 1))").is_err());
    }

    #[test]
    fn test_dangling_connective() {
        assert!(parse_filter("INTERSECTS(a, POINT(1 1)) AND").is_err());
        assert!(parse_filter("OR a = 1").is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let n = 10_000;
        let filter = format!("{}INCLUDE{}", "(".repeat(n), ")".repeat(n));
        assert!(matches!(parse_filter(&filter), Err(FilterError::TooDeep { .. })));

        let negated = format!("{}INCLUDE", "NOT ".repeat(n));
        assert!(matches!(parse_filter(&negated), Err(FilterError::TooDeep { .. })));

        let opaque = format!("f{}1{} = 2", "(".repeat(n), ")".repeat(n));
        assert!(matches!(parse_filter(&opaque), Err(FilterError::TooDeep { .. })));

        let wkt = format!(
            "INTERSECTS(g, {}POINT(1 1){})",
            "GEOMETRYCOLLECTION(".repeat(n),
            ")".repeat(n)
        );
        assert!(matches!(parse_filter(&wkt), Err(FilterError::TooDeep { .. })));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let filter = format!("{}INTERSECTS(a, {}){}", "(".repeat(100), POLYGON_1, ")".repeat(100));
        assert!(matches!(parse_filter(&filter).unwrap(), Expr::Spatial(_)));
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(parse_filter("  ").unwrap_err(), FilterError::Empty);
    }
}
