//! CQL token types.

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The token kind
    pub kind: TokenKind,
    /// Source location (start byte offset)
    pub start: usize,
    /// Source location (end byte offset)
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Check for a bare identifier, ignoring ASCII case
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(name) if name.eq_ignore_ascii_case(keyword))
    }
}

/// Token kinds for CQL/ECQL filters.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// Bare identifier or keyword: `the_geom`, `INTERSECTS`, `gml:name`
    Ident(String),

    /// Double-quoted identifier (unescaped content)
    QuotedIdent(String),

    /// Numeric literal, sign included
    Number(f64),

    /// Single-quoted string literal (unescaped content)
    String(String),

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,

    /// Comparison or arithmetic operator: `=`, `<>`, `<=`, `+`, ...
    Operator(String),

    /// Any other character, kept so opaque terms can swallow it
    Symbol(char),

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short human-readable form for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::QuotedIdent(name) => format!("identifier \"{}\"", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::String(s) => format!("string '{}'", s),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Operator(op) => format!("operator '{}'", op),
            TokenKind::Symbol(c) => format!("'{}'", c),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}
