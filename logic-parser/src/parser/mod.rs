pub mod lexer;
pub mod parser;
pub mod token;

use crate::error::LogicError;
use crate::ir::ast::Expr;
use crate::ir::memory::{FunctionTable, Memory};

/// From text straight to statement results, with a fresh scope.
pub fn parse(source: &str) -> Result<Vec<Expr>, LogicError> {
    let tokens = lexer::tokenize(source)?;
    let mut memory = Memory::new();
    let mut functions = FunctionTable::new();
    let results = parser::Parser::new(tokens, &mut memory, &mut functions)
        .parse_all()
        .collect::<Result<_, _>>()?;
    Ok(results)
}
