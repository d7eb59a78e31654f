use std::collections::HashMap;

use super::ast::Expr;
use crate::parser::token::Token;

/// What a variable is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Expression(Expr),
}

impl Value {
    pub fn to_expr(&self) -> Expr {
        match self {
            Self::Boolean(value) => Expr::Literal(*value),
            Self::Expression(expr) => expr.clone(),
        }
    }

    pub fn eval(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            Self::Expression(expr) => expr.eval(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Self::Expression(expr)
    }
}

/// Variable bindings visible to one parser. Function calls get a fresh one.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    bindings: HashMap<String, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A user-declared function. The body is kept as raw tokens and parsed again
/// on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Token>,
}

#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `function`, returning the declaration it replaced.
    pub fn declare(&mut self, function: Function) -> Option<Function> {
        self.functions.insert(function.name.clone(), function)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn function(name: &str, params: &[&str], body: &str) -> Function {
        Function {
            name: name.to_string(),
            params: params.iter().map(|param| param.to_string()).collect(),
            body: tokenize(body).unwrap(),
        }
    }

    #[test]
    fn memory_rebinds_names() {
        let mut memory = Memory::new();
        assert!(memory.is_empty());

        memory.assign("A", true);
        memory.assign("A", Expr::not(Expr::Literal(true)));
        assert_eq!(memory.len(), 1);
        assert!(!memory.is_empty());
        assert_eq!(memory.get("A").and_then(Value::eval), Some(false));
    }

    #[test]
    fn declare_returns_replaced_function() {
        let mut functions = FunctionTable::new();
        assert!(functions.is_empty());

        assert!(functions.declare(function("F", &["x"], "x")).is_none());
        let previous = functions.declare(function("F", &["x", "y"], "x ^ y"));

        assert_eq!(previous.map(|f| f.params), Some(vec!["x".to_string()]));
        assert_eq!(functions.len(), 1);
        assert_eq!(functions.get("F").map(|f| f.params.len()), Some(2));
    }
}
