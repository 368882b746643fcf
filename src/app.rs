//! One invocation of the tool, end to end.
//!
//! Loads configuration, resolves the profile, reads the statement, runs it
//! and writes the rendered result. The connector is injected so the whole
//! pipeline runs against a mock in tests.

use crate::cli::Cli;
use crate::config::{resolve_profile, ConfigResolver};
use crate::db::Connector;
use crate::error::Result;
use crate::input;
use crate::output;
use crate::query::{ExecutionRequest, QueryExecutor};
use std::io::{Read, Write};
use std::process::ExitCode;
use tracing::{debug, info};

/// How the invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

/// Wires the resolver, executor and renderer together.
pub struct Runner<'a> {
    resolver: &'a ConfigResolver,
    connector: &'a dyn Connector,
}

impl<'a> Runner<'a> {
    pub fn new(resolver: &'a ConfigResolver, connector: &'a dyn Connector) -> Self {
        Self {
            resolver,
            connector,
        }
    }

    /// Runs one invocation, writing everything user-visible to `out`.
    ///
    /// Returns `Err` for fatal problems found before execution (bad config,
    /// missing fields, no SQL); execution failures are rendered and reported
    /// as [`Outcome::Failure`].
    pub async fn run(
        &self,
        cli: &Cli,
        stdin: Option<&mut dyn Read>,
        out: &mut dyn Write,
    ) -> Result<Outcome> {
        let (document, warnings) = self.resolver.load(cli.config.as_deref())?;
        write_warnings(out, &warnings);

        if cli.list_profiles {
            write_line(out, document.render_profile_list().trim_end());
            return Ok(Outcome::Success);
        }

        let (connection, warnings) =
            resolve_profile(&document, cli.profile.as_deref(), &cli.overrides())?;
        write_warnings(out, &warnings);
        info!(
            "Using profile '{}': {}",
            connection.name,
            connection.display_string()
        );

        let statement = input::read_statement(cli.query.as_deref(), cli.file.as_deref(), stdin)?;
        debug!("Statement length: {} bytes", statement.len());

        let request = ExecutionRequest {
            connection,
            statement,
            output_format: cli.output,
        };
        let result = QueryExecutor::new(self.connector).execute(&request).await;
        write_line(out, &output::render(&result, request.output_format));

        Ok(if result.is_success() {
            Outcome::Success
        } else {
            Outcome::Failure
        })
    }
}

fn write_warnings(out: &mut dyn Write, warnings: &[String]) {
    for warning in warnings {
        write_line(out, &format!("警告: {warning}"));
    }
}

fn write_line(out: &mut dyn Write, text: &str) {
    if let Err(e) = writeln!(out, "{text}") {
        debug!("Failed to write output: {}", e);
    }
}
