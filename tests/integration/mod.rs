//! Integration tests for sqlserver-executor.
//!
//! Pipeline and configuration tests run against a mock connector. The
//! live-server tests need a SQL Server instance; set MSSQL_TEST_SERVER,
//! MSSQL_TEST_DATABASE, MSSQL_TEST_USER and MSSQL_TEST_PASSWORD to run them.

pub mod config_test;
pub mod pipeline_test;
