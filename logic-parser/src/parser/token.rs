use std::fmt;

use crate::ir::ast::BinaryOperator;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Never produced by `tokenize`; tolerated between statements.
    Whitespace,
    Newline,
    LParen,        // (
    RParen,        // )
    Comma,         // ,
    /// `// ...`, carrying the rest of the line.
    Comment(String),
    Identifier(String),
    /// `0` or `1`
    Literal(bool),
    Not,           // ~
    And,           // ^
    Or,            // v
    Xor,           // !=
    Implication,   // =>
    Biconditional, // <=>
    Assign,        // :=
}

impl TokenKind {
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            Self::And => Some(BinaryOperator::And),
            Self::Or => Some(BinaryOperator::Or),
            Self::Xor => Some(BinaryOperator::Xor),
            Self::Implication => Some(BinaryOperator::Implication),
            Self::Biconditional => Some(BinaryOperator::Biconditional),
            _ => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whitespace => write!(f, "whitespace"),
            Self::Newline => write!(f, "new line"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Comment(_) => write!(f, "comment"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::Literal(value) => write!(f, "{}", u8::from(*value)),
            Self::Not => write!(f, "~"),
            Self::And => write!(f, "^"),
            Self::Or => write!(f, "v"),
            Self::Xor => write!(f, "!="),
            Self::Implication => write!(f, "=>"),
            Self::Biconditional => write!(f, "<=>"),
            Self::Assign => write!(f, ":="),
        }
    }
}

/// A scanned token: its kind, the exact source text, and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }

    /// Boolean payload of a literal token.
    pub fn literal(&self) -> Option<bool> {
        match self.kind {
            TokenKind::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}
