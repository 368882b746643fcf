//! Statement execution for sqlserver-executor.
//!
//! Isolates the gate-connect-run-release sequence from the CLI wiring.

pub mod executor;

pub use executor::{ExecutionRequest, ExecutionResult, QueryExecutor};
