//! # Pythia — a small, dynamically-typed, expression-oriented scripting language
//!
//! Pythia programs are read by a [`token::Lexer`], assembled into an [`ast::Program`] by a
//! Pratt [`parse::Parser`], and executed by a tree-walking [`eval::Evaluator`]. Runtime failures
//! never panic or unwind: they surface as ordinary [`value::Value::Error`] values that flow
//! through evaluation like any other result, so a host embedding this crate always gets a
//! [`value::Value`] back rather than a `Result` to match on.
//!
//! ```
//! use pythia::run_source;
//!
//! let mut out = Vec::new();
//! let result = run_source("let x = 2 + 3; x * 10;", &mut out).unwrap();
//! assert_eq!(result.inspect(), "50");
//! ```

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod parse;
pub mod token;
pub mod value;

use std::io::Write;

pub use error::{ParseError, PythiaError};
pub use value::Value;

/// Parses and evaluates `source` against a fresh root environment, writing anything `print`
/// produces to `out`.
///
/// Returns `Err` only for a parse failure (host-facing, spec §4.2); a runtime fault is `Ok` of
/// an `Error` value, exactly as it would be if returned from inside the program.
pub fn run_source<W: Write>(source: &str, out: W) -> Result<Value, Vec<ParseError>> {
    let (program, errors) = parse::parse_program(source);
    if !errors.is_empty() {
        return Err(errors);
    }
    let env = env::Environment::new_root();
    let evaluator = eval::Evaluator::new(out);
    Ok(evaluator.eval_program(&program, &env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_source_returns_the_final_expression_value() {
        let mut out = Vec::new();
        let result = run_source("1 + 2;", &mut out).unwrap();
        assert!(matches!(result, Value::Integer(3)));
    }

    #[test]
    fn run_source_reports_parse_errors_without_evaluating() {
        let mut out = Vec::new();
        let errors = run_source("let = 5;", &mut out).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn print_writes_to_the_supplied_sink() {
        let mut out = Vec::new();
        run_source(r#"print("hi");"#, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hi\n");
    }
}
