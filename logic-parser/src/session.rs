use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::error::LogicError;
use crate::ir::ast::Expr;
use crate::ir::memory::{FunctionTable, Memory};
use crate::parser::lexer::tokenize;
use crate::parser::parser::Parser;

pub const PROMPT: &str = "?> ";
pub const EXIT_COMMAND: &str = "exit";

/// Variables and functions shared by everything run through one session:
/// a whole file, or every line typed into the REPL.
#[derive(Debug, Default)]
pub struct Session {
    memory: Memory,
    functions: FunctionTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Runs every statement of `source`, handing each result to `on_result`
    /// as soon as it is produced. Stops at the first error.
    pub fn run<F>(&mut self, source: &str, mut on_result: F) -> Result<usize, LogicError>
    where
        F: FnMut(&Expr),
    {
        let tokens = tokenize(source)?;
        let mut parser = Parser::new(tokens, &mut self.memory, &mut self.functions);

        let mut count = 0;
        for result in parser.parse_all() {
            on_result(&result?);
            count += 1;
        }

        debug!(statements = count, "finished run");
        Ok(count)
    }

    /// Evaluates one line of input. `None` means the line produced no value
    /// (assignment, declaration, comment, or nothing at all).
    pub fn eval_line(&mut self, line: &str) -> Result<Option<bool>, LogicError> {
        let tokens = tokenize(line)?;
        let result = Parser::new(tokens, &mut self.memory, &mut self.functions).parse()?;
        Ok(result.eval())
    }
}

/// Interactive loop: reads lines from `input` until `exit` or end of input,
/// printing values and errors to `output`. Errors never end the loop.
pub fn run_repl<R, W>(session: &mut Session, input: R, mut output: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Propositional Logic REPL")?;
    let mut lines = input.lines();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output, "\nExiting REPL")?;
            return Ok(());
        };
        let line = line?;
        if line.trim() == EXIT_COMMAND {
            writeln!(output, "\nExiting REPL")?;
            return Ok(());
        }

        match session.eval_line(&line) {
            Ok(Some(value)) => writeln!(output, "{value}")?,
            Ok(None) => {}
            Err(err) => match err.position() {
                Some((_, column)) => {
                    writeln!(output, "Error at position {column}: {}.", err.message())?
                }
                None => writeln!(output, "Error: {}.", err.message())?,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl(input: &str) -> String {
        let mut session = Session::new();
        let mut output = Vec::new();
        run_repl(&mut session, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn run_reports_every_statement() {
        let mut session = Session::new();
        let mut values = Vec::new();
        let count = session
            .run("A := 1\n// note\nA\n~A", |expr| values.push(expr.eval()))
            .unwrap();

        assert_eq!(count, 4);
        assert_eq!(values, vec![None, None, Some(true), Some(false)]);
        assert!(session.memory().contains("A"));
    }

    #[test]
    fn run_stops_at_first_error() {
        let mut session = Session::new();
        let mut seen = 0;
        let err = session
            .run("A := 1\nB\nA", |_| seen += 1)
            .unwrap_err();

        assert_eq!(seen, 1);
        assert_eq!(err.position(), Some((2, 1)));
    }

    #[test]
    fn lines_share_state() {
        let mut session = Session::new();
        assert_eq!(session.eval_line("NAND(x, y) := ~(x ^ y)").unwrap(), None);
        assert_eq!(session.eval_line("A := 1").unwrap(), None);
        assert_eq!(session.eval_line("NAND(A, A)").unwrap(), Some(false));
        assert!(session.functions().contains("NAND"));
    }

    #[test]
    fn repl_prints_values_and_keeps_going_after_errors() {
        let output = repl("A := 1\nA\nA $ B\nB\n~A\nexit\nA\n");
        assert_eq!(
            output,
            "Propositional Logic REPL\n\
             ?> ?> true\n\
             ?> Error at position 3: Invalid character '$'.\n\
             ?> Error at position 1: No value found for variable name 'B'.\n\
             ?> false\n\
             ?> \nExiting REPL\n"
        );
    }

    #[test]
    fn repl_exits_on_end_of_input() {
        assert!(repl("").ends_with("?> \nExiting REPL\n"));
    }

    #[test]
    fn repl_errors_without_position() {
        let output = repl("(1\n");
        assert!(output.contains("Error: Expected ')' but reached end of input."));
    }

    #[test]
    fn repl_survives_limit_errors() {
        let deep = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        let output = repl(&format!("{deep}\n{}1\n1\n", "~".repeat(200_000)));
        assert!(output.ends_with(
            "?> Error at position 65: Maximum nesting depth exceeded.\n\
             ?> Error at position 65: Maximum nesting depth exceeded.\n\
             ?> true\n\
             ?> \nExiting REPL\n"
        ));
    }

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();
        assert!(session.memory().is_empty());
        assert!(session.functions().is_empty());
    }
}
