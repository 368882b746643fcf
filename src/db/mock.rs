//! Mock database connector for testing.
//!
//! Returns a scripted outcome and records every interaction, so tests can
//! assert on connection attempts, submitted SQL, commits and closes.

use super::{Connector, DatabaseSession, StatementOutput, Value};
use crate::config::ConnectionProfile;
use crate::error::{ExecutorError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
enum Script {
    Output { output: StatementOutput, affected: u64 },
    RefuseConnection(String),
    FailStatement(String),
}

/// Everything the mock has observed.
#[derive(Debug, Default)]
struct Journal {
    connects: usize,
    executed: Vec<String>,
    commits: usize,
    closes: usize,
}

/// A connector that never touches the network.
#[derive(Debug, Clone)]
pub struct MockConnector {
    script: Script,
    journal: Arc<Mutex<Journal>>,
}

impl MockConnector {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            journal: Arc::default(),
        }
    }

    /// Every statement returns the given columns and rows.
    pub fn returning_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self::with_script(Script::Output {
            output: StatementOutput {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
            affected: 0,
        })
    }

    /// Every statement returns no columns and reports `affected` rows.
    pub fn returning_affected(affected: u64) -> Self {
        Self::with_script(Script::Output {
            output: StatementOutput::default(),
            affected,
        })
    }

    /// Every connection attempt fails with the given message.
    pub fn refusing_connection(message: impl Into<String>) -> Self {
        Self::with_script(Script::RefuseConnection(message.into()))
    }

    /// Connections succeed but every statement fails with the given message.
    pub fn failing_statement(message: impl Into<String>) -> Self {
        Self::with_script(Script::FailStatement(message.into()))
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        lock(&self.journal)
    }

    /// Number of connection attempts made.
    pub fn connect_attempts(&self) -> usize {
        self.journal().connects
    }

    /// SQL submitted through any session, in order.
    pub fn executed(&self) -> Vec<String> {
        self.journal().executed.clone()
    }

    /// Number of commits issued.
    pub fn commits(&self) -> usize {
        self.journal().commits
    }

    /// Number of sessions closed.
    pub fn closes(&self) -> usize {
        self.journal().closes
    }
}

fn lock(journal: &Mutex<Journal>) -> MutexGuard<'_, Journal> {
    journal.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _profile: &ConnectionProfile) -> Result<Box<dyn DatabaseSession>> {
        self.journal().connects += 1;

        if let Script::RefuseConnection(message) = &self.script {
            return Err(ExecutorError::connection(message.clone()));
        }

        Ok(Box::new(MockSession {
            script: self.script.clone(),
            journal: Arc::clone(&self.journal),
            open: true,
        }))
    }
}

struct MockSession {
    script: Script,
    journal: Arc<Mutex<Journal>>,
    open: bool,
}

#[async_trait]
impl DatabaseSession for MockSession {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutput> {
        lock(&self.journal).executed.push(sql.to_string());

        match &self.script {
            Script::Output { output, .. } => Ok(output.clone()),
            Script::FailStatement(message) => Err(ExecutorError::query(message.clone())),
            Script::RefuseConnection(message) => Err(ExecutorError::connection(message.clone())),
        }
    }

    async fn rows_affected(&mut self) -> Result<u64> {
        match &self.script {
            Script::Output { affected, .. } => Ok(*affected),
            _ => Ok(0),
        }
    }

    async fn commit(&mut self) -> Result<()> {
        lock(&self.journal).commits += 1;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.open {
            self.open = false;
            lock(&self.journal).closes += 1;
        }
        Ok(())
    }
}
