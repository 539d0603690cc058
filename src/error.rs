//! Error types for the parser and the host-facing CLI.
//!
//! Runtime errors are deliberately *not* modeled here: per spec §7 they are first-class
//! [`crate::value::Value::Error`] values that flow through `eval` like any other value. This
//! module only covers (a) parser diagnostics, accumulated rather than thrown (spec §4.2), and
//! (b) fatal host-level failures the CLI can hit before the language core ever runs.

use std::fmt;

use crate::token::Position;

/// A single parser diagnostic. The parser never stops at the first one; it keeps a `Vec` of
/// these and the caller decides whether to evaluate anyway (it shouldn't, per spec §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    pub fn expected_token(expected: &str, got: &str, position: Position) -> Self {
        Self::new(
            format!("expected next token to be {expected}, got {got} instead"),
            position,
        )
    }

    pub fn no_prefix_parse_fn(token: &str, position: Position) -> Self {
        Self::new(format!("no prefix parse function for {token} found"), position)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// Fatal errors the CLI can encounter outside the language core: these can never arise from
/// running a Pythia program, only from the host trying to run one.
#[derive(Debug, thiserror::Error)]
pub enum PythiaError {
    #[error("could not read script {path}: {source}")]
    ReadScript {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to output sink: {0}")]
    Output(#[source] std::io::Error),
}
