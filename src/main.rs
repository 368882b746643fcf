//! sqlserver-executor - run ad-hoc SQL against SQL Server profiles.

use sqlserver_executor::app::Runner;
use sqlserver_executor::cli::Cli;
use sqlserver_executor::config::ConfigResolver;
use sqlserver_executor::db::MssqlConnector;
use sqlserver_executor::logging;
use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    let resolver = ConfigResolver::default();
    let connector = MssqlConnector;

    let stdin = io::stdin();
    let mut piped = (!stdin.is_terminal()).then(|| stdin.lock());
    let mut stdout = io::stdout().lock();

    let result = Runner::new(&resolver, &connector)
        .run(
            &cli,
            piped.as_mut().map(|s| s as &mut dyn Read),
            &mut stdout,
        )
        .await;

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            debug!("{}: {}", e.category(), e);
            let _ = writeln!(stdout, "错误: {e}");
            ExitCode::FAILURE
        }
    }
}
