//! Configuration loading integration tests.
//!
//! Exercises file discovery and profile resolution against real files.

use sqlserver_executor::config::{ConfigLocator, ConfigResolver, PartialProfile};
use sqlserver_executor::error::{ConnectionField, ExecutorError};
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

const PROFILES: &str = r#"{
    "default": "dev",
    "connections": {
        "dev":  {"server": "dev-host",  "database": "DevDB",  "user": "sa",  "password": "pw"},
        "prod": {"server": "prod-host", "database": "ProdDB", "user": "app", "password": "secret", "port": 2433}
    }
}"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_explicit_file_is_the_only_source() {
    let dir = tempdir().unwrap();
    let searched = write(&dir, "searched.json", r#"{"server": "from-search"}"#);
    let explicit = write(&dir, "explicit.json", PROFILES);

    let resolver = ConfigResolver::new(ConfigLocator::new(vec![searched]));
    let (profile, warnings) = resolver
        .resolve(Some(&explicit), None, &PartialProfile::default())
        .unwrap();

    assert_eq!(profile.name, "dev");
    assert_eq!(profile.server, "dev-host");
    assert!(warnings.is_empty());
}

#[test]
fn test_search_order_first_hit_wins() {
    let dir = tempdir().unwrap();
    let first = write(
        &dir,
        "first.json",
        r#"{"server": "a", "database": "A", "user": "u", "password": "p"}"#,
    );
    let second = write(&dir, "second.json", PROFILES);

    let resolver = ConfigResolver::new(ConfigLocator::new(vec![
        dir.path().join("absent.json"),
        first,
        second,
    ]));
    let (profile, _) = resolver
        .resolve(None, None, &PartialProfile::default())
        .unwrap();

    assert_eq!(profile.server, "a");
    assert_eq!(profile.name, "default");
}

#[test]
fn test_named_profile_with_overrides() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "c.json", PROFILES);
    let resolver = ConfigResolver::new(ConfigLocator::new(Vec::new()));

    let overrides = PartialProfile {
        database: Some("Reporting".to_string()),
        ..Default::default()
    };
    let (profile, _) = resolver
        .resolve(Some(&path), Some("prod"), &overrides)
        .unwrap();

    assert_eq!(profile.server, "prod-host");
    assert_eq!(profile.database, "Reporting");
    assert_eq!(profile.port, 2433);
}

#[test]
fn test_unknown_profile_warns_and_falls_back() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "c.json", PROFILES);
    let resolver = ConfigResolver::new(ConfigLocator::new(Vec::new()));

    let (profile, warnings) = resolver
        .resolve(Some(&path), Some("staging"), &PartialProfile::default())
        .unwrap();

    assert_eq!(profile.name, "dev");
    assert_eq!(warnings, vec!["配置 'staging' 不存在，使用默认配置"]);
}

#[test]
fn test_missing_explicit_file_then_incomplete() {
    let dir = tempdir().unwrap();
    let resolver = ConfigResolver::new(ConfigLocator::new(Vec::new()));

    let result = resolver.resolve(
        Some(&dir.path().join("nope.json")),
        None,
        &PartialProfile::default(),
    );

    match result {
        Err(ExecutorError::ConfigIncomplete(fields)) => {
            assert_eq!(
                fields,
                vec![
                    ConnectionField::Server,
                    ConnectionField::Database,
                    ConnectionField::User,
                    ConnectionField::Password,
                ]
            );
        }
        other => panic!("Expected ConfigIncomplete, got {other:?}"),
    }
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "bad.json", "{ \"connections\": [1, 2");
    let resolver = ConfigResolver::new(ConfigLocator::new(Vec::new()));

    let result = resolver.load(Some(&path));
    assert!(matches!(result, Err(ExecutorError::Config(_))));
}
