//! sqlserver-executor - run ad-hoc SQL against SQL Server profiles.
//!
//! Statements containing DELETE are rejected before a connection is opened.
//! This library exposes the core modules for the binary and integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod query;
pub mod safety;
