use tracing::debug;

use super::token::{Token, TokenKind};
use crate::error::TokenizerError;
use crate::span::Span;

/// Scans `source` into tokens, stopping at the first invalid construct.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizerError> {
    let tokens = Lexer::new(source).run()?;
    debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Characters that end an identifier.
fn is_reserved(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '(' | ')' | ',' | '~' | '^' | 'v' | '=' | '<' | '>' | '!' | ':' | '/'
        )
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    // Characters consumed on the current line.
    column: usize,
    tokens: Vec<Token>,
}

#[derive(Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizerError> {
        while let Some(ch) = self.peek(0) {
            let start = self.mark();
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start);
                    self.line += 1;
                    self.column = 0;
                }
                '~' => self.single(TokenKind::Not, start),
                '^' => self.single(TokenKind::And, start),
                'v' => self.single(TokenKind::Or, start),
                '(' => self.single(TokenKind::LParen, start),
                ')' => self.single(TokenKind::RParen, start),
                ',' => self.single(TokenKind::Comma, start),
                '0' | '1' => self.single(TokenKind::Literal(ch == '1'), start),
                '=' => {
                    self.bump();
                    self.expect('>')?;
                    self.push(TokenKind::Implication, start);
                }
                '<' => {
                    self.bump();
                    self.expect('=')?;
                    self.expect('>')?;
                    self.push(TokenKind::Biconditional, start);
                }
                '!' => {
                    self.bump();
                    self.expect('=')?;
                    self.push(TokenKind::Xor, start);
                }
                ':' => {
                    self.bump();
                    self.expect('=')?;
                    self.push(TokenKind::Assign, start);
                }
                '/' => {
                    self.bump();
                    self.expect('/')?;
                    let text_start = self.position;
                    while self.peek(0).is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                    let text: String = self.chars[text_start..self.position].iter().collect();
                    self.push(TokenKind::Comment(text), start);
                }
                c if c.is_alphabetic() => {
                    self.bump();
                    while self
                        .peek(0)
                        .is_some_and(|c| (c.is_alphanumeric() || c == '_') && !is_reserved(c))
                    {
                        self.bump();
                    }
                    let name: String = self.chars[start.position..self.position].iter().collect();
                    self.push(TokenKind::Identifier(name), start);
                }
                other => {
                    return Err(self.error(format!("Invalid character '{other}'")));
                }
            }
        }

        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) {
        self.position += 1;
        self.column += 1;
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Consumes the next character of a multi-character operator.
    fn expect(&mut self, expected: char) -> Result<(), TokenizerError> {
        match self.peek(0) {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("Expected '{expected}' got '{ch}'"))),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn single(&mut self, kind: TokenKind, start: Mark) {
        self.bump();
        self.push(kind, start);
    }

    fn push(&mut self, kind: TokenKind, start: Mark) {
        let lexeme: String = self.chars[start.position..self.position].iter().collect();
        let span = Span {
            line: start.line,
            column: start.column + 1,
            start: start.position,
            end: self.position,
        };
        self.tokens.push(Token::new(kind, lexeme, span));
    }

    fn error(&self, message: impl Into<String>) -> TokenizerError {
        TokenizerError::new(message, self.line, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn simple_conjunction() {
        assert_eq!(kinds("A ^ B"), vec![ident("A"), TokenKind::And, ident("B")]);
    }

    #[test]
    fn negation() {
        assert_eq!(kinds("~A"), vec![TokenKind::Not, ident("A")]);
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(kinds("A => B")[1], TokenKind::Implication);
        assert_eq!(kinds("A <=> B")[1], TokenKind::Biconditional);
        assert_eq!(kinds("A != B")[1], TokenKind::Xor);
        assert_eq!(kinds("A := 1")[1], TokenKind::Assign);

        let tokens = tokenize("A <=> B").unwrap();
        assert_eq!(tokens[1].lexeme, "<=>");
        assert_eq!(tokens[1].span.start, 2);
        assert_eq!(tokens[1].span.end, 5);
    }

    #[test]
    fn v_is_always_disjunction() {
        assert_eq!(
            kinds("~(A^B)vC"),
            vec![
                TokenKind::Not,
                TokenKind::LParen,
                ident("A"),
                TokenKind::And,
                ident("B"),
                TokenKind::RParen,
                TokenKind::Or,
                ident("C"),
            ]
        );
        assert_eq!(kinds("AvB"), vec![ident("A"), TokenKind::Or, ident("B")]);
    }

    #[test]
    fn identifiers_may_contain_digits() {
        assert_eq!(kinds("XOR1 := 1")[0], ident("XOR1"));
    }

    #[test]
    fn literals_are_single_digits() {
        assert_eq!(
            kinds("10"),
            vec![TokenKind::Literal(true), TokenKind::Literal(false)]
        );
    }

    #[test]
    fn newlines_are_tokens() {
        assert_eq!(
            kinds("A\nB"),
            vec![ident("A"), TokenKind::Newline, ident("B")]
        );
    }

    #[test]
    fn comment_carries_rest_of_line() {
        assert_eq!(
            kinds("// hello there\nA"),
            vec![
                TokenKind::Comment(" hello there".to_string()),
                TokenKind::Newline,
                ident("A"),
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("A := 1\nB := 0\n  C := 1\n").unwrap();

        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));

        let b = tokens.iter().find(|t| t.lexeme == "B").unwrap();
        assert_eq!((b.line(), b.column()), (2, 1));

        let c = tokens.iter().find(|t| t.lexeme == "C").unwrap();
        assert_eq!((c.line(), c.column()), (3, 3));
    }

    #[test]
    fn invalid_character_reports_position() {
        let err = tokenize("A := 1\nB := 0\nC := 1\nD := 2\n").unwrap_err();
        assert_eq!(err.message, "Invalid character '2'");
        assert_eq!((err.line, err.column), (4, 6));

        assert!(tokenize("R := A $ B").is_err());
    }

    #[test]
    fn incomplete_operators_fail() {
        let err = tokenize("A : B").unwrap_err();
        assert_eq!(err.message, "Expected '=' got ' '");
        assert_eq!(err.column, 4);

        assert!(tokenize("A = B").is_err());
        assert!(tokenize("A <= B").is_err());
        assert!(tokenize("A / B").is_err());
    }

    #[test]
    fn operator_cut_off_by_end_of_input() {
        let err = tokenize("A <=").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
        assert_eq!((err.line, err.column), (1, 5));
    }
}
