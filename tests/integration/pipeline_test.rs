//! End-to-end pipeline tests.
//!
//! Drive `Runner` with parsed CLI arguments, real config files and a mock
//! connector, and check exactly what reaches stdout.

use clap::Parser;
use pretty_assertions::assert_eq;
use sqlserver_executor::app::{Outcome, Runner};
use sqlserver_executor::cli::Cli;
use sqlserver_executor::config::{ConfigLocator, ConfigResolver};
use sqlserver_executor::db::{MockConnector, Value};
use sqlserver_executor::error::ExecutorError;
use std::io::{Cursor, Read};
use tempfile::{tempdir, TempDir};

const CONFIG: &str = r#"{
    "default": "dev",
    "connections": {
        "dev": {"server": "localhost", "database": "DevDB", "user": "sa", "password": "password"},
        "prod": {"server": "prod-server", "database": "ProdDB", "user": "app_user", "password": "secret"}
    }
}"#;

struct Fixture {
    dir: TempDir,
    config: String,
    resolver: ConfigResolver,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, CONFIG).unwrap();
    Fixture {
        config: path.display().to_string(),
        dir,
        resolver: ConfigResolver::new(ConfigLocator::new(Vec::new())),
    }
}

async fn run(
    fx: &Fixture,
    mock: &MockConnector,
    args: &[&str],
    stdin: Option<&mut dyn Read>,
) -> (Result<Outcome, ExecutorError>, String) {
    let mut argv = vec!["sqlserver-executor", "-c", fx.config.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::parse_from(argv);

    let mut out = Vec::new();
    let result = Runner::new(&fx.resolver, mock).run(&cli, stdin, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_delete_is_blocked_end_to_end() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(5);

    let (result, stdout) = run(&fx, &mock, &["-q", "/* purge */ DELETE FROM Orders"], None).await;

    let outcome = result.unwrap();
    assert_eq!(outcome, Outcome::Failure);
    assert_eq!(outcome.code(), 1);
    assert!(stdout.contains("安全限制：不允许执行 DELETE 语句"));
    assert_eq!(mock.connect_attempts(), 0);
    assert!(mock.executed().is_empty());
}

#[tokio::test]
async fn test_delete_hidden_in_batch_is_blocked() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(1);
    let mut stdin = Cursor::new("INSERT INTO T VALUES(1);\ndelete from T");

    let (result, _) = run(&fx, &mock, &[], Some(&mut stdin)).await;

    assert_eq!(result.unwrap(), Outcome::Failure);
    assert_eq!(mock.connect_attempts(), 0);
}

#[tokio::test]
async fn test_select_table_output() {
    let fx = fixture();
    let mock = MockConnector::returning_rows(
        &["id", "name"],
        vec![
            vec![Value::Int(1), Value::from("Al")],
            vec![Value::Int(20), Value::from("Bea")],
        ],
    );

    let (result, stdout) = run(&fx, &mock, &["-q", "SELECT id, name FROM people"], None).await;

    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(
        stdout,
        "id | name\n---+-----\n1  | Al  \n20 | Bea \n\n共 2 行\n"
    );
    assert_eq!(mock.executed(), vec!["SELECT id, name FROM people"]);
}

#[tokio::test]
async fn test_select_json_output_from_file() {
    let fx = fixture();
    let sql_path = fx.dir.path().join("q.sql");
    std::fs::write(&sql_path, "SELECT name FROM people").unwrap();
    let mock = MockConnector::returning_rows(&["name"], vec![vec![Value::from("李雷")]]);

    let (result, stdout) = run(
        &fx,
        &mock,
        &["-f", sql_path.to_str().unwrap(), "-o", "json"],
        None,
    )
    .await;

    assert_eq!(result.unwrap(), Outcome::Success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([{"name": "李雷"}]));
    assert!(stdout.contains("李雷"));
}

#[tokio::test]
async fn test_update_reports_affected_rows() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(7);

    let (result, stdout) = run(
        &fx,
        &mock,
        &["--profile", "prod", "-q", "UPDATE t SET x = 1"],
        None,
    )
    .await;

    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(stdout, "执行成功，影响行数: 7\n");
    assert_eq!(mock.commits(), 1);
    assert_eq!(mock.closes(), 1);
}

#[tokio::test]
async fn test_empty_result_message() {
    let fx = fixture();
    let mock = MockConnector::returning_rows(&["id"], Vec::new());

    let (result, stdout) = run(&fx, &mock, &["-q", "SELECT id FROM t WHERE 1 = 0"], None).await;

    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(stdout, "查询成功，无数据返回\n");
}

#[tokio::test]
async fn test_driver_error_is_reported_not_raised() {
    let fx = fixture();
    let mock = MockConnector::failing_statement("Invalid object name 'missing'.");

    let (result, stdout) = run(&fx, &mock, &["-q", "SELECT * FROM missing", "-o", "csv"], None).await;

    assert_eq!(result.unwrap(), Outcome::Failure);
    assert_eq!(stdout, "错误: Invalid object name 'missing'.\n");
    assert_eq!(mock.closes(), 1);
}

#[tokio::test]
async fn test_unknown_profile_prints_warning_first() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(0);

    let (result, stdout) = run(
        &fx,
        &mock,
        &["--profile", "qa", "-q", "CREATE TABLE t (id INT)"],
        None,
    )
    .await;

    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(
        stdout,
        "警告: 配置 'qa' 不存在，使用默认配置\n执行成功，影响行数: 0\n"
    );
}

#[tokio::test]
async fn test_list_profiles() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(0);

    let (result, stdout) = run(&fx, &mock, &["--list-profiles"], None).await;

    assert_eq!(result.unwrap(), Outcome::Success);
    assert!(stdout.starts_with("可用的数据库配置:\n"));
    assert!(stdout.contains("  dev (默认)\n    服务器: localhost\n    数据库: DevDB\n"));
    assert!(stdout.contains("  prod\n    服务器: prod-server\n"));
    assert_eq!(mock.connect_attempts(), 0);
}

#[tokio::test]
async fn test_missing_sql_file_is_fatal() {
    let fx = fixture();
    let mock = MockConnector::returning_affected(0);

    let (result, _) = run(&fx, &mock, &["-f", "/no/such/query.sql"], None).await;

    match result {
        Err(e @ ExecutorError::InputMissing(_)) => {
            assert_eq!(e.to_string(), "文件不存在 - /no/such/query.sql");
        }
        other => panic!("Expected InputMissing, got {other:?}"),
    }
    assert_eq!(mock.connect_attempts(), 0);
}

#[tokio::test]
async fn test_legacy_config_lists_nothing_and_runs_without_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{"server": "old-host", "database": "OldDB", "user": "sa", "password": "pw", "port": "2433"}"#,
    )
    .unwrap();
    let fx = Fixture {
        config: path.display().to_string(),
        dir,
        resolver: ConfigResolver::new(ConfigLocator::new(Vec::new())),
    };
    let mock = MockConnector::returning_affected(2);

    let (result, stdout) = run(&fx, &mock, &["--list-profiles"], None).await;
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(stdout, "未找到任何数据库配置\n");

    let (result, stdout) = run(
        &fx,
        &mock,
        &["--profile", "dev", "-q", "UPDATE t SET x = 1"],
        None,
    )
    .await;
    assert_eq!(result.unwrap(), Outcome::Success);
    assert_eq!(stdout, "执行成功，影响行数: 2\n");
}
