//! End-to-end CLI tests for the doi-engagement binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

/// Builds a command isolated from the user's config and environment.
fn cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("doi-engagement").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("GRAPH_ACCESS_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Track social engagement"))
        .stdout(predicate::str::contains("derive-urls"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("doi-engagement"));
}

/// Test that a missing subcommand causes non-zero exit.
#[test]
fn test_binary_without_subcommand_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).assert().failure();
}

#[test]
fn test_import_then_status_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("engagement.db");
    let input = dir.path().join("dois.csv");
    fs::write(
        &input,
        "doi,url\n10.1000/xyz123,http://example.org/a\nnot-a-doi,\n",
    )
    .unwrap();

    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("import")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"))
        .stdout(predicate::str::contains("added     1"));

    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("identifiers            1"))
        .stdout(predicate::str::contains("urls                   1"));
}

#[test]
fn test_reimport_reports_already_present() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("engagement.db");
    let input = dir.path().join("dois.tsv");
    fs::write(&input, "doi\turl\n10.1000/xyz123\thttp://example.org/a\n").unwrap();

    for _ in 0..2 {
        cmd(dir.path())
            .arg("--database")
            .arg(&db)
            .args(["import", "--delimiter", "tab"])
            .arg(&input)
            .assert()
            .success();
    }

    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("import batches         2"))
        .stdout(predicate::str::contains("identifiers            1"));
}

#[test]
fn test_import_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--database")
        .arg(dir.path().join("engagement.db"))
        .arg("import")
        .arg(dir.path().join("absent.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read import file"));
}

#[test]
fn test_import_malformed_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "title,link\nx,y\n").unwrap();

    cmd(dir.path())
        .arg("--database")
        .arg(dir.path().join("engagement.db"))
        .arg("import")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed import payload"));
}

#[test]
fn test_fetch_engagement_without_token_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--database")
        .arg(dir.path().join("engagement.db"))
        .arg("fetch-engagement")
        .assert()
        .failure()
        .stderr(predicate::str::contains("access token"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "read_timeout_secs = 0\n").unwrap();

    cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("read_timeout_secs"));
}

#[test]
fn test_config_file_supplies_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("from-config.db");
    let config_dir = dir.path().join("doi-engagement");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("database = {:?}\n", db.display().to_string()),
    )
    .unwrap();

    cmd(dir.path()).arg("status").assert().success();
    assert!(db.exists());
}

#[test]
fn test_purge_identifiers_empties_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("engagement.db");
    let input = dir.path().join("dois.csv");
    fs::write(&input, "doi\n10.1000/xyz123\n10.1000/abc\n").unwrap();

    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("import")
        .arg(&input)
        .assert()
        .success();
    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("purge-identifiers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 identifier(s)"));
}

#[test]
fn test_fetch_engagement_item_failure_still_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("engagement.db");
    let input = dir.path().join("dois.csv");
    fs::write(&input, "doi,url\n10.1000/xyz123,http://example.org/a\n").unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        "graph_base_url = \"http://127.0.0.1:9\"\nconnect_timeout_secs = 2\nread_timeout_secs = 2\n",
    )
    .unwrap();

    cmd(dir.path())
        .arg("--database")
        .arg(&db)
        .arg("import")
        .arg(&input)
        .assert()
        .success();

    cmd(dir.path())
        .env("GRAPH_ACCESS_TOKEN", "test-token")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(&db)
        .arg("fetch-engagement")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 0 snapshot(s)"))
        .stdout(predicate::str::contains("Failed (1)"))
        .stdout(predicate::str::contains("test-token").not());
}
