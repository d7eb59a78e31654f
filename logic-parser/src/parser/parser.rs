use std::iter::FusedIterator;

use tracing::{debug, trace};

use super::token::{Token, TokenKind};
use crate::error::ParserError;
use crate::ir::ast::{BinaryOperator, Expr, Shape};
use crate::ir::memory::{Function, FunctionTable, Memory, Value};

/// Nested function calls allowed before a call is rejected.
pub const MAX_CALL_DEPTH: usize = 64;
/// Open parentheses and `~` prefixes allowed at once, across calls.
pub const MAX_NESTING_DEPTH: usize = 64;
/// Largest tree a single expression may build.
pub const MAX_EXPRESSION_NODES: usize = 1 << 16;
pub const MAX_EXPRESSION_DEPTH: usize = 1024;

type ParseFn<'a> = fn(&mut Parser<'a>) -> Result<Built, ParserError>;

/// A tree under construction, with its shape kept alongside so limits are
/// checked without walking it again.
struct Built {
    expr: Expr,
    shape: Shape,
}

impl Built {
    fn leaf(expr: Expr) -> Self {
        Self {
            expr,
            shape: Shape::LEAF,
        }
    }

    fn measured(expr: Expr) -> Self {
        let shape = expr.shape();
        Self { expr, shape }
    }
}

/// Recursive-descent parser over one token sequence.
///
/// Statements are evaluated as they are parsed: assignments write into
/// `memory`, declarations into `functions`, and calls run a nested parser over
/// the function body with its own memory.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    memory: &'a mut Memory,
    functions: &'a mut FunctionTable,
    depth: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, memory: &'a mut Memory, functions: &'a mut FunctionTable) -> Self {
        Self {
            tokens,
            position: 0,
            memory,
            functions,
            depth: 0,
            nesting: 0,
        }
    }

    /// Lazily parses every remaining statement.
    pub fn parse_all(&mut self) -> Statements<'_, 'a> {
        Statements {
            parser: self,
            failed: false,
        }
    }

    /// Runs every remaining statement and returns the last one that has a
    /// value, or `Void` if none did.
    pub fn parse(&mut self) -> Result<Expr, ParserError> {
        let mut last = Expr::Void;
        for result in self.parse_all() {
            let expr = result?;
            if !expr.is_void() {
                last = expr;
            }
        }
        Ok(last)
    }

    /// Parses exactly one statement, including its terminating newline.
    pub fn parse_one(&mut self) -> Result<Expr, ParserError> {
        self.skip_comment();
        if self.at_statement_end() {
            self.end_statement()?;
            return Ok(Expr::Void);
        }

        let result = match (self.peek_kind(0), self.peek_kind(1)) {
            (Some(TokenKind::Identifier(_)), Some(TokenKind::Assign)) => self.parse_assignment()?,
            (Some(TokenKind::Identifier(_)), Some(TokenKind::LParen))
                if self.is_function_declaration() =>
            {
                return self.parse_function_declaration();
            }
            _ => self.parse_expression()?,
        };

        self.end_statement()?;
        Ok(result)
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParserError> {
        let name = self.expect_identifier("Invalid variable name")?;
        self.expect(&TokenKind::Assign)?;

        let literal = match self.peek() {
            None => {
                return Err(ParserError::new(
                    "Invalid assignment syntax. Variables should receive Identifiers, Literals or Expressions",
                    None,
                ));
            }
            Some(token) => token.literal().map(|value| (value, token.clone())),
        };

        let value = match literal {
            Some((value, token)) => {
                let followed_by_end = matches!(
                    self.peek_kind(1),
                    None | Some(TokenKind::Newline | TokenKind::Comment(_))
                );
                if !followed_by_end {
                    return Err(ParserError::new(
                        "Invalid variable assignment. It should be followed by new line",
                        Some(&token),
                    ));
                }
                self.advance();
                Value::Boolean(value)
            }
            None => Value::Expression(self.parse_expression()?),
        };

        debug!(variable = %name, "assigned variable");
        self.memory.assign(name, value);
        Ok(Expr::Void)
    }

    /// `NAME ( ... ) :=` with nothing but identifiers and commas in between.
    fn is_function_declaration(&self) -> bool {
        let mut offset = 2;
        while let Some(kind) = self.peek_kind(offset) {
            match kind {
                TokenKind::RParen => {
                    return self.peek_kind(offset + 1) == Some(&TokenKind::Assign);
                }
                TokenKind::Identifier(_) | TokenKind::Comma => offset += 1,
                _ => return false,
            }
        }
        false
    }

    fn parse_function_declaration(&mut self) -> Result<Expr, ParserError> {
        let name = self.expect_identifier("Invalid function declaration")?;
        self.expect(&TokenKind::LParen)?;

        let mut params: Vec<String> = Vec::new();
        for token in self.parse_identifier_list("Invalid function declaration")? {
            let param = token.identifier().unwrap_or_default().to_string();
            if params.contains(&param) {
                return Err(ParserError::new(
                    format!("Duplicate parameter '{param}' in function '{name}'"),
                    Some(&token),
                ));
            }
            params.push(param);
        }

        let assign = self.expect(&TokenKind::Assign)?;

        let mut body = Vec::new();
        while let Some(token) = self.advance() {
            if token.kind == TokenKind::Newline {
                break;
            }
            body.push(token.clone());
        }
        if body.iter().all(|token| matches!(token.kind, TokenKind::Comment(_))) {
            return Err(ParserError::new(
                format!("Function '{name}' has an empty body"),
                Some(&assign),
            ));
        }

        if let Some(token) = body.iter().find(|token| token.kind == TokenKind::Assign) {
            return Err(ParserError::new(
                format!("Function '{name}' body must be an expression"),
                Some(token),
            ));
        }

        debug!(function = %name, ?params, "declared function");
        if let Some(previous) = self.functions.declare(Function { name, params, body }) {
            debug!(function = %previous.name, "replaced earlier declaration");
        }
        Ok(Expr::Void)
    }

    /// Parses `IDENT ("," IDENT)* ")"` after an opening parenthesis.
    fn parse_identifier_list(&mut self, context: &str) -> Result<Vec<Token>, ParserError> {
        let mut names = Vec::new();
        if self.check(&TokenKind::RParen) {
            self.advance();
            return Ok(names);
        }

        loop {
            match self.advance() {
                Some(token) if token.identifier().is_some() => names.push(token.clone()),
                other => return Err(ParserError::new(context, other)),
            }
            match self.advance() {
                Some(token) if token.kind == TokenKind::RParen => break,
                Some(token) if token.kind == TokenKind::Comma => continue,
                other => return Err(ParserError::new(context, other)),
            }
        }
        Ok(names)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParserError> {
        self.parse_biconditional().map(|built| built.expr)
    }

    fn parse_biconditional(&mut self) -> Result<Built, ParserError> {
        self.parse_binary(BinaryOperator::Biconditional, Self::parse_implication)
    }

    fn parse_implication(&mut self) -> Result<Built, ParserError> {
        self.parse_binary(BinaryOperator::Implication, Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Built, ParserError> {
        self.parse_binary(BinaryOperator::Or, Self::parse_xor)
    }

    fn parse_xor(&mut self) -> Result<Built, ParserError> {
        self.parse_binary(BinaryOperator::Xor, Self::parse_and)
    }

    fn parse_and(&mut self) -> Result<Built, ParserError> {
        self.parse_binary(BinaryOperator::And, Self::parse_not)
    }

    /// Left fold: `next (op next)*`.
    fn parse_binary(&mut self, op: BinaryOperator, next: ParseFn<'a>) -> Result<Built, ParserError> {
        let mut left = next(self)?;
        while let Some(token) = self
            .peek()
            .filter(|token| token.kind.binary_operator() == Some(op))
            .cloned()
        {
            self.advance();
            let right = next(self)?;
            let shape = bounded(Shape::binary(left.shape, right.shape), &token)?;
            left = Built {
                expr: Expr::binary(left.expr, op, right.expr),
                shape,
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Built, ParserError> {
        let Some(token) = self.peek().filter(|token| token.kind == TokenKind::Not).cloned() else {
            return self.parse_primary();
        };
        self.advance();

        let operand = self.nested(&token, Self::parse_not)?;
        let shape = bounded(Shape::unary(operand.shape), &token)?;
        Ok(Built {
            expr: Expr::not(operand.expr),
            shape,
        })
    }

    fn parse_primary(&mut self) -> Result<Built, ParserError> {
        let Some(token) = self.advance().cloned() else {
            return Err(ParserError::new("Unexpected end of input", None));
        };

        match &token.kind {
            TokenKind::Literal(value) => Ok(Built::leaf(Expr::Literal(*value))),
            TokenKind::LParen => {
                let inner = self.nested(&token, Self::parse_biconditional)?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Identifier(name) if self.check(&TokenKind::LParen) => {
                self.parse_call(name, &token)
            }
            TokenKind::Identifier(name) => self.resolve(name, &token),
            _ => Err(unexpected(&token)),
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(&mut self, token: &Token, parse: ParseFn<'a>) -> Result<Built, ParserError> {
        if self.nesting >= MAX_NESTING_DEPTH {
            return Err(ParserError::new("Maximum nesting depth exceeded", Some(token)));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    fn resolve(&self, name: &str, token: &Token) -> Result<Built, ParserError> {
        let value = self.memory.get(name).ok_or_else(|| {
            ParserError::new(format!("No value found for variable name '{name}'"), Some(token))
        })?;
        Ok(Built::measured(value.to_expr()))
    }

    fn parse_call(&mut self, name: &str, name_token: &Token) -> Result<Built, ParserError> {
        let Some(function) = self.functions.get(name).cloned() else {
            return Err(ParserError::new(
                format!("Function named '{name}' not found"),
                Some(name_token),
            ));
        };

        self.advance(); // (
        let args = self.parse_identifier_list("Function arguments must be variable names")?;

        if args.len() != function.params.len() {
            return Err(ParserError::new(
                format!(
                    "Expected {} arguments for function '{}', got {}",
                    function.params.len(),
                    function.name,
                    args.len()
                ),
                Some(name_token),
            ));
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(ParserError::new(
                format!("Maximum call depth exceeded in function '{name}'"),
                Some(name_token),
            ));
        }

        let mut local = Memory::new();
        for (param, arg) in function.params.iter().zip(&args) {
            let arg_name = arg.identifier().unwrap_or_default();
            let value = self.memory.get(arg_name).cloned().ok_or_else(|| {
                ParserError::new(format!("No value found for variable name '{arg_name}'"), Some(arg))
            })?;
            local.assign(param.clone(), value);
        }

        trace!(function = %name, depth = self.depth + 1, "calling function");
        let mut callee = Parser::new(function.body, &mut local, &mut *self.functions);
        callee.depth = self.depth + 1;
        callee.nesting = self.nesting;
        let result = callee.parse_one()?;

        if result.is_void() {
            return Err(ParserError::new(
                format!("Function '{name}' did not produce a value"),
                Some(name_token),
            ));
        }
        Ok(Built::measured(result))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.position + offset).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind(0) == Some(kind)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Token, ParserError> {
        match self.advance() {
            Some(token) if token.kind == *expected => Ok(token.clone()),
            Some(token) => Err(ParserError::new(
                format!("Expected '{expected}' got '{}'", token.kind),
                Some(token),
            )),
            None => Err(ParserError::new(
                format!("Expected '{expected}' but reached end of input"),
                None,
            )),
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, ParserError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(name.clone()),
            other => Err(ParserError::new(context, other)),
        }
    }

    fn skip_comment(&mut self) {
        if matches!(self.peek_kind(0), Some(TokenKind::Comment(_))) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while self.peek_kind(0).is_some_and(TokenKind::is_separator) {
            self.advance();
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.peek_kind(0), None | Some(TokenKind::Newline))
    }

    /// Accepts an optional trailing comment, then a newline or end of input.
    fn end_statement(&mut self) -> Result<(), ParserError> {
        self.skip_comment();
        match self.advance() {
            None => Ok(()),
            Some(token) if token.kind == TokenKind::Newline => Ok(()),
            Some(token) => Err(unexpected(token)),
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }
}

/// Rejects trees past [`MAX_EXPRESSION_NODES`] or [`MAX_EXPRESSION_DEPTH`].
fn bounded(shape: Shape, token: &Token) -> Result<Shape, ParserError> {
    if shape.nodes > MAX_EXPRESSION_NODES {
        return Err(ParserError::new("Expression too large", Some(token)));
    }
    if shape.depth > MAX_EXPRESSION_DEPTH {
        return Err(ParserError::new("Expression too deep", Some(token)));
    }
    Ok(shape)
}

fn unexpected(token: &Token) -> ParserError {
    ParserError::new(format!("Unexpected token '{}'", token.kind), Some(token))
}

/// Statement results pulled one at a time from a [`Parser`].
///
/// Stops after the first error; the parser cursor is left where it failed.
pub struct Statements<'p, 'a> {
    parser: &'p mut Parser<'a>,
    failed: bool,
}

impl Iterator for Statements<'_, '_> {
    type Item = Result<Expr, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.parser.skip_separators();
        if self.parser.is_at_end() {
            return None;
        }

        let result = self.parser.parse_one();
        self.failed = result.is_err();
        Some(result)
    }
}

impl FusedIterator for Statements<'_, '_> {}
