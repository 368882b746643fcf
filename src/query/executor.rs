//! Statement execution with the DELETE gate.
//!
//! Opens one session per request, submits the statement, and turns whatever
//! happens into an [`ExecutionResult`]. Errors never escape this boundary.

use crate::config::ConnectionProfile;
use crate::db::{Connector, DatabaseSession, RowSet};
use crate::error::{ExecutorError, Result};
use crate::output::OutputFormat;
use crate::safety::{self, StatementKind};
use std::time::Instant;
use tracing::{debug, info};

/// Everything needed to run one statement.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub connection: ConnectionProfile,
    pub statement: String,
    pub output_format: OutputFormat,
}

/// Outcome of executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// The statement returned a row set.
    Rows(RowSet),
    /// The statement changed data; carries the affected-row count.
    Affected(u64),
    /// The statement was rejected or failed.
    Failure(String),
}

impl ExecutionResult {
    /// Returns true unless this is a failure.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure(_))
    }
}

impl From<ExecutorError> for ExecutionResult {
    fn from(error: ExecutorError) -> Self {
        Self::Failure(error.to_string())
    }
}

/// Query executor that gates and runs statements.
pub struct QueryExecutor<'a> {
    connector: &'a dyn Connector,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(connector: &'a dyn Connector) -> Self {
        Self { connector }
    }

    /// Gates, runs and classifies one statement.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        if let Err(e) = safety::check_statement(&request.statement) {
            info!("Statement rejected: {}", e);
            return e.into();
        }

        let start = Instant::now();
        let mut session = match self.connector.connect(&request.connection).await {
            Ok(session) => session,
            Err(e) => {
                info!("{}: {}", e.category(), e);
                return e.into();
            }
        };

        let outcome = run_statement(session.as_mut(), &request.statement).await;

        if let Err(e) = session.close().await {
            debug!("Error while closing connection: {}", e);
        }

        match outcome {
            Ok(result) => {
                info!("Statement finished in {:?}", start.elapsed());
                result
            }
            Err(e) => {
                info!("{}: {}", e.category(), e);
                e.into()
            }
        }
    }
}

async fn run_statement(session: &mut dyn DatabaseSession, sql: &str) -> Result<ExecutionResult> {
    let output = session.execute(sql).await?;

    let kind = safety::classify(sql, output.has_result_columns());
    debug!("Statement classified as {}", kind);

    match kind {
        StatementKind::Query => Ok(ExecutionResult::Rows(RowSet::from_output(output))),
        StatementKind::Command => {
            let affected = session.rows_affected().await?;
            session.commit().await?;
            Ok(ExecutionResult::Affected(affected))
        }
    }
}
