//! Hand-written CQL lexer.
//!
//! Produces tokens with byte spans into the filter text. Characters that
//! have no meaning to the spatial parser come out as [`TokenKind::Symbol`]
//! so that opaque terms (dates, arithmetic, vendor functions) do not fail
//! the whole filter.

use super::token::{Token, TokenKind};
use crate::error::{FilterError, Result};

/// Lexer over a single filter expression.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the entire input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.pos;

            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, start, start));
                break;
            };

            let kind = self.next_token(c)?;
            tokens.push(Token::new(kind, start, self.pos));
        }

        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn next_token(&mut self, c: char) -> Result<TokenKind> {
        match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '\'' => self.string(),
            '"' => self.quoted_ident(),
            '+' | '-' if self.starts_number(1) => self.number(),
            _ if self.starts_number(0) => self.number(),
            _ if c.is_alphabetic() || c == '_' => Ok(self.ident()),
            '=' | '<' | '>' | '!' | '+' | '-' | '*' | '/' => Ok(self.operator()),
            _ => self.single(TokenKind::Symbol(c)),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Result<TokenKind> {
        self.bump();
        Ok(kind)
    }

    /// A digit, or a `.` followed by a digit, at lookahead `n`
    fn starts_number(&self, n: usize) -> bool {
        match self.peek_nth(n) {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_nth(n + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn number(&mut self) -> Result<TokenKind> {
        let start = self.pos;

        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        self.eat_digits();
        if self.peek() == Some('.') {
            self.bump();
            self.eat_digits();
        }

        // exponent only when digits follow, so `2e` stays a number then an ident
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_nth(1), Some('+' | '-')));
            if self.peek_nth(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.bump();
                }
                self.eat_digits();
            }
        }

        let text = &self.input[start..self.pos];
        // overflowing literals such as 1e400 parse to infinity
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(TokenKind::Number)
            .ok_or_else(|| FilterError::InvalidNumber { text: text.to_string(), offset: start })
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == ':' || c == '.')
        {
            self.bump();
        }
        TokenKind::Ident(self.input[start..self.pos].to_string())
    }

    /// Read quoted content up to `quote`; a doubled quote is an escaped quote
    fn quoted(&mut self, quote: char) -> Option<String> {
        self.bump();
        let mut content = String::new();

        loop {
            match self.bump()? {
                c if c == quote => {
                    if self.peek() == Some(quote) {
                        self.bump();
                        content.push(quote);
                    } else {
                        return Some(content);
                    }
                }
                c => content.push(c),
            }
        }
    }

    fn string(&mut self) -> Result<TokenKind> {
        let offset = self.pos;
        self.quoted('\'')
            .map(TokenKind::String)
            .ok_or(FilterError::UnterminatedString { offset })
    }

    fn quoted_ident(&mut self) -> Result<TokenKind> {
        let offset = self.pos;
        self.quoted('"')
            .map(TokenKind::QuotedIdent)
            .ok_or(FilterError::UnterminatedIdentifier { offset })
    }

    fn operator(&mut self) -> TokenKind {
        let start = self.pos;
        let first = self.bump();
        let second = self.peek();

        if matches!(
            (first, second),
            (Some('<'), Some('>' | '=')) | (Some('>' | '!'), Some('='))
        ) {
            self.bump();
        }

        TokenKind::Operator(self.input[start..self.pos].to_string())
    }
}

/// Tokenize a filter expression.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    Lexer::new(input).tokenize()
}
