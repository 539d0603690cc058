//! The `pythia` command-line front end: a REPL when invoked with no arguments, a one-shot script
//! runner when given a path.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pythia::env::Environment;
use pythia::error::PythiaError;
use pythia::eval::Evaluator;
use pythia::parse::parse_program;
use pythia::value::Value;

/// A small, dynamically-typed, expression-oriented scripting language.
#[derive(Parser)]
#[command(name = "pythia", version, about)]
struct Args {
    /// Script to run. Omit to start an interactive REPL instead.
    script: Option<PathBuf>,

    /// Suppress the REPL's startup banner.
    #[arg(long)]
    no_banner: bool,

    /// Raise the tracing filter by one level on top of RUST_LOG (warn -> info -> debug -> trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;

fn verbosity_filter(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(args.verbose))
        .with_writer(io::stderr)
        .init();

    match &args.script {
        Some(path) => run_file(path),
        None => {
            run_repl(!args.no_banner);
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(source) => {
            let err = PythiaError::ReadScript {
                path: path.display().to_string(),
                source,
            };
            error!(error = %err, "could not read script");
            return ExitCode::from(EX_DATAERR);
        }
    };

    let (program, errors) = parse_program(&source);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("{err}");
        }
        return ExitCode::from(EX_DATAERR);
    }

    let env = Environment::new_root();
    let stdout = io::stdout();
    let evaluator = Evaluator::new(stdout.lock());
    let result = evaluator.eval_program(&program, &env);

    match result {
        Value::Error(msg) => {
            eprintln!("ERROR: {msg}");
            ExitCode::from(EX_SOFTWARE)
        }
        _ => ExitCode::SUCCESS,
    }
}

fn run_repl(show_banner: bool) {
    if show_banner {
        println!("pythia {} — .quit to exit", env!("CARGO_PKG_VERSION"));
    }
    info!("starting REPL");

    let env = Environment::new_root();
    let stdout = io::stdout();
    let evaluator = Evaluator::new(stdout.lock());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("» ");
        let _ = io::stdout().flush();

        let Some(line) = lines.next() else {
            break;
        };
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!(error = %err, "failed to read from stdin");
                break;
            }
        };

        let (program, errors) = parse_program(&line);
        if !errors.is_empty() {
            for err in &errors {
                println!("{err}");
            }
            continue;
        }

        let result = evaluator.eval_program(&program, &env);
        if !matches!(result, Value::Null) {
            println!("{}", result.inspect());
        }
    }
}
