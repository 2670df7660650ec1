//! CQL lexer module.
//!
//! Tokenizes a filter expression into tokens carrying byte spans.

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
