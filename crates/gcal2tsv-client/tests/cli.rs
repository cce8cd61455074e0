//! End-to-end checks of the `gcal2tsv` binary that need no network.

use std::path::Path;
use std::process::{Command, Output};

fn gcal2tsv(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcal2tsv"))
        .args(args)
        .env("HOME", home)
        .env_remove("GCAL2TSV_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run gcal2tsv")
}

fn write_config(dir: &Path, client_secret: &str) -> std::path::PathBuf {
    let secret = dir.join("client_secret.json");
    std::fs::write(&secret, client_secret).unwrap();

    let config = dir.join("config.toml");
    std::fs::write(
        &config,
        format!(
            r#"
[Date]
Start = "2024-06-01"
End = "2024-06-30"

[Output]
Filename = "{out}"
Type = "sjis"

[GCal]
client_secret = "{secret}"
calender_id = "primary"
token_cache = "{token}"
"#,
            out = dir.join("out.tsv").display(),
            secret = secret.display(),
            token = dir.join("token.json").display(),
        ),
    )
    .unwrap();
    config
}

#[test]
fn malformed_client_secret_fails_before_network() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{ this is not json");

    let output = gcal2tsv(dir.path(), &["--config", config.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr: {}", stderr);
    assert!(stderr.contains("client secret"), "stderr: {}", stderr);
    assert!(!dir.path().join("token.json").exists());
    assert!(!dir.path().join("out.tsv").exists());
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let output = gcal2tsv(dir.path(), &["--config", missing.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration error"), "stderr: {}", stderr);
}

#[test]
fn config_path_prints_selected_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = gcal2tsv(dir.path(), &["--config", "work.toml", "config", "path"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "config: work.toml\n");
}

#[test]
fn config_dump_shows_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "{}");

    let output = gcal2tsv(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--start",
            "2024-07-01",
            "--end",
            "2024-08-01",
            "config",
            "dump",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Start = \"2024-07-01\""), "stdout: {}", stdout);
    assert!(stdout.contains("calender_id = \"primary\""), "stdout: {}", stdout);
}

#[test]
fn config_validate_rejects_inverted_range() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"{"installed":{"client_id":"id.apps.googleusercontent.com","client_secret":"s"}}"#,
    );

    let output = gcal2tsv(
        dir.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--start",
            "2024-07-01",
            "config",
            "validate",
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration error"), "stderr: {}", stderr);
}
