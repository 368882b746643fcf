//! Statement safety classification module.
//!
//! Rejects statements containing a DELETE before they reach the server, and
//! decides after execution whether a statement produced rows or changed them.

mod scanner;

pub use scanner::{classify, is_delete_statement, is_query, normalize};

use crate::error::{ExecutorError, Result};
use std::fmt;

/// Shape of a statement's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Returns a row set.
    Query,
    /// Changes data or schema; reports an affected-row count.
    Command,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "Query"),
            Self::Command => write!(f, "Command"),
        }
    }
}

/// Gate applied before any connection is opened.
pub fn check_statement(sql: &str) -> Result<()> {
    if is_delete_statement(sql) {
        Err(ExecutorError::PolicyViolation)
    } else {
        Ok(())
    }
}
