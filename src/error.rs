//! Error types for sqlserver-executor.
//!
//! Defines the main error enum used throughout the application. Display
//! strings are the user-facing messages printed after `错误: `.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a statement is rejected by the DELETE gate.
pub const POLICY_VIOLATION_MESSAGE: &str = "安全限制：不允许执行 DELETE 语句";

/// A mandatory connection field that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionField {
    Server,
    Database,
    User,
    Password,
}

impl ConnectionField {
    /// All mandatory fields, in reporting order.
    pub const REQUIRED: [ConnectionField; 4] =
        [Self::Server, Self::Database, Self::User, Self::Password];

    /// Field name as it appears in the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Database => "database",
            Self::User => "user",
            Self::Password => "password",
        }
    }

    /// Short command-line flag that supplies this field.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Server => "-s",
            Self::Database => "-d",
            Self::User => "-u",
            Self::Password => "-p",
        }
    }
}

impl fmt::Display for ConnectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.flag())
    }
}

/// Main error type for sqlserver-executor operations.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// An explicitly requested configuration file does not exist.
    #[error("指定的配置文件不存在 - {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Configuration file could not be read or parsed.
    #[error("{0}")]
    Config(String),

    /// One or more mandatory connection fields are unresolved.
    #[error("缺少必要的连接参数: {}", join_fields(.0))]
    ConfigIncomplete(Vec<ConnectionField>),

    /// The statement matched the DELETE gate.
    #[error("{}", POLICY_VIOLATION_MESSAGE)]
    PolicyViolation,

    /// Database connection errors (host unreachable, login failed, etc.)
    #[error("{0}")]
    Connection(String),

    /// Statement execution errors reported by the server or driver.
    #[error("{0}")]
    Query(String),

    /// No SQL text could be obtained.
    #[error("{0}")]
    InputMissing(String),
}

fn join_fields(fields: &[ConnectionField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ExecutorError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an input error with the given message.
    pub fn input_missing(msg: impl Into<String>) -> Self {
        Self::InputMissing(msg.into())
    }

    /// Returns the error category as a string for log output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ConfigNotFound(_) => "Config Not Found",
            Self::Config(_) => "Configuration Error",
            Self::ConfigIncomplete(_) => "Configuration Incomplete",
            Self::PolicyViolation => "Policy Violation",
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::InputMissing(_) => "Input Missing",
        }
    }
}

/// Result type alias using ExecutorError.
pub type Result<T> = std::result::Result<T, ExecutorError>;
