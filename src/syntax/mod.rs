//! Declaration syntax
//!
//! A lexer, AST and recursive-descent parser for the subset of TypeScript
//! that appears in declaration (`.d.ts`) files. The bundler works on the
//! token stream (it needs byte spans to rewrite module specifiers in place);
//! the projector works on the AST.

pub mod ast;
mod lexer;
mod parser;

use thiserror::Error;

pub use lexer::{quote, tokenize, unquote, Token, TokenKind};
pub use parser::parse;

/// A lexing or parsing failure, positioned in the source text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
