//! # logic-parser
//!
//! An interpreter for a small propositional logic language: boolean literals
//! `0`/`1`, the connectives `~ ^ v != => <=>`, variables bound with `:=`, and
//! user functions such as `NAND(x, y) := ~(x ^ y)`.
//!
//! ```
//! use logic_parser::evaluate;
//!
//! let results = evaluate("A := 1\nB := 0\nA => B").unwrap();
//! assert_eq!(results, vec![None, None, Some(false)]);
//! ```

pub mod error;
pub mod ir;
pub mod parser;
pub mod session;
pub mod span;

pub use error::{LogicError, ParserError, TokenizerError};
pub use ir::ast::{BinaryOperator, Expr, Shape, UnaryOperator};
pub use ir::memory::{Function, FunctionTable, Memory, Value};
pub use parser::lexer::tokenize;
pub use parser::parser::{Parser, Statements};
pub use parser::token::{Token, TokenKind};
pub use session::Session;

/// Runs `source` in a fresh session and returns the truth value of every
/// statement, `None` for statements without one.
pub fn evaluate(source: &str) -> Result<Vec<Option<bool>>, LogicError> {
    let results = parser::parse(source)?;
    Ok(results.iter().map(Expr::eval).collect())
}
