use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use logic_parser::session::{self, Session};
use logic_parser::{LogicError, tokenize};

#[derive(Parser, Debug)]
#[command(name = "logic-parser")]
#[command(about = "Propositional logic interpreter", version)]
#[command(after_help = "If no file is provided, starts the interactive REPL.\n\
    When running a file, values go to stdout; the first error is reported on \
    stderr as <FILE>:<LINE>:<COLUMN>: <MESSAGE>. and the exit status is 1.")]
struct Cli {
    /// File with logic statements to evaluate
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the tokens of the file before running it
    #[arg(long)]
    show_tokens: bool,

    /// Print the tree of every statement that has a value
    #[arg(long)]
    show_ast: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.input {
        Some(path) => match run_file(path, &cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{}", err.report(path));
                ExitCode::FAILURE
            }
        },
        None => {
            let mut session = Session::new();
            let stdin = io::stdin();
            match session::run_repl(&mut session, stdin.lock(), io::stdout()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run_file(path: &Path, cli: &Cli) -> Result<(), LogicError> {
    info!("Running {}", path.display());

    let source = fs::read_to_string(path).map_err(|source| LogicError::Io {
        path: path.display().to_string(),
        source,
    })?;

    if cli.show_tokens {
        println!("=== TOKENS ===");
        for token in tokenize(&source)? {
            println!("{token:?}");
        }
        println!("=== RESULTS ===");
    }

    let mut session = Session::new();
    let count = session.run(&source, |expr| {
        if let Some(value) = expr.eval() {
            if cli.show_ast {
                println!("{expr}");
            }
            println!("{value}");
        }
    })?;

    debug!(
        statements = count,
        variables = session.memory().len(),
        functions = session.functions().len(),
        "file finished"
    );
    Ok(())
}
