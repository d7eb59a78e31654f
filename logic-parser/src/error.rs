use std::path::Path;

use thiserror::Error;

use crate::parser::token::Token;

/// Lexical failure: the source contains something the tokenizer can't scan.
///
/// `column` is 1-based and points at the offending character.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct TokenizerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl TokenizerError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Syntax or name-resolution failure raised while parsing a statement.
///
/// The offending token is attached when one is known; errors raised at the
/// end of input have none.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ParserError {
    pub message: String,
    pub token: Option<Token>,
}

impl ParserError {
    pub fn new(message: impl Into<String>, token: Option<&Token>) -> Self {
        Self {
            message: message.into(),
            token: token.cloned(),
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.token.as_ref().map(|token| token.span.line)
    }

    pub fn column(&self) -> Option<usize> {
        self.token.as_ref().map(|token| token.span.column)
    }
}

#[derive(Error, Debug)]
pub enum LogicError {
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Parser(#[from] ParserError),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl LogicError {
    /// Line and column of the failure, when the error carries them.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Tokenizer(err) => Some((err.line, err.column)),
            Self::Parser(err) => err.line().zip(err.column()),
            Self::Io { .. } => None,
        }
    }

    /// The bare message, without position information.
    pub fn message(&self) -> String {
        match self {
            Self::Tokenizer(err) => err.message.clone(),
            Self::Parser(err) => err.message.clone(),
            Self::Io { source, .. } => source.to_string(),
        }
    }

    /// Diagnostic line for a failed run of `path`:
    /// `<path>:<line>:<column>: <message>.`, or `<path>: <message>.` when no
    /// position is known.
    pub fn report(&self, path: &Path) -> String {
        match self.position() {
            Some((line, column)) => {
                format!("{}:{line}:{column}: {}.", path.display(), self.message())
            }
            None => format!("{}: {}.", path.display(), self.message()),
        }
    }
}
