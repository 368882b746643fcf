//! Database abstraction layer for sqlserver-executor.
//!
//! Provides a trait-based interface for opening a session and running one
//! statement, so the executor can be exercised without a live server.

mod mock;
mod mssql;
mod types;

pub use mock::MockConnector;
pub use mssql::MssqlConnector;
pub use types::{Row, RowSet, StatementOutput, Value};

use crate::config::ConnectionProfile;
use crate::error::Result;
use async_trait::async_trait;

/// Opens database sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new session for the given profile.
    async fn connect(&self, profile: &ConnectionProfile) -> Result<Box<dyn DatabaseSession>>;
}

/// One open connection to the server.
///
/// Work done through a session is not durable until [`commit`] is called;
/// closing without committing rolls it back.
///
/// [`commit`]: DatabaseSession::commit
#[async_trait]
pub trait DatabaseSession: Send {
    /// Submits the SQL text verbatim as a single batch.
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput>;

    /// Rows affected by the last statement of the previous batch.
    async fn rows_affected(&mut self) -> Result<u64>;

    /// Commits the open transaction, if any.
    async fn commit(&mut self) -> Result<()>;

    /// Closes the session. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
