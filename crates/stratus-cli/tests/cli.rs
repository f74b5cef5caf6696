use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::{TempDir, tempdir};

fn stratus(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("stratus").expect("stratus binary");
    cmd.env("STRATUS_HOME", home)
        .env_remove("STRATUS_TRACE")
        .env_remove("STRATUS_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn config_path(home: &Path) -> std::path::PathBuf {
    home.join(".stratus").join("config.json")
}

fn home_with_session(session: &serde_json::Value) -> TempDir {
    let home = tempdir().expect("tempdir");
    let path = config_path(home.path());
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, serde_json::to_vec_pretty(session).expect("json")).expect("write");
    home
}

fn logged_in(auth_method: &str) -> serde_json::Value {
    serde_json::json!({
        "api_endpoint": "https://api.example.invalid",
        "api_version": "2.150.0",
        "authorization_endpoint": "https://login.example.invalid",
        "access_token": "access-token",
        "refresh_token": "refresh-token",
        "auth_method": auth_method,
        "organization": { "guid": "org-guid", "name": "my-org" }
    })
}

#[test]
fn sso_and_passcode_conflict_in_either_order() {
    let home = tempdir().expect("tempdir");
    for args in [
        ["login", "--sso", "--sso-passcode", "1"],
        ["login", "--sso-passcode", "1", "--sso"],
    ] {
        stratus(home.path())
            .args(args)
            .assert()
            .code(1)
            .stderr(contains(
                "Incorrect Usage: --sso-passcode flag cannot be used with --sso",
            ));
    }
    assert!(!config_path(home.path()).exists());
}

#[test]
fn passcode_flag_without_value_is_a_usage_error() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .args(["login", "--sso-passcode"])
        .assert()
        .code(1)
        .stderr(contains("expected argument for flag `--sso-passcode'"));
}

#[test]
fn human_login_over_service_account_is_refused() {
    let session = logged_in("client_credentials");
    let home = home_with_session(&session);
    let before = fs::read(config_path(home.path())).expect("read");

    stratus(home.path())
        .args(["login", "-u", "admin", "-p", "secret"])
        .assert()
        .code(1)
        .stderr(contains("Service account currently logged in."));

    assert_eq!(fs::read(config_path(home.path())).expect("read"), before);
}

#[test]
fn auth_without_endpoint_never_prompts() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .args(["auth", "admin", "secret"])
        .write_stdin("should-not-be-read\n")
        .assert()
        .code(1)
        .stderr(contains("no API endpoint set"));
}

#[test]
fn login_without_input_fails_cleanly() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .arg("login")
        .write_stdin("")
        .assert()
        .code(1)
        .stdout(contains("API endpoint"))
        .stderr(contains("FAILED"));
    assert!(!config_path(home.path()).exists());
}

#[test]
fn logout_keeps_endpoint() {
    let home = home_with_session(&logged_in("password"));
    stratus(home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("OK"));

    let saved: serde_json::Value =
        serde_json::from_slice(&fs::read(config_path(home.path())).expect("read")).expect("json");
    assert_eq!(saved["api_endpoint"], "https://api.example.invalid");
    assert!(saved.get("access_token").is_none());
    assert!(saved.get("organization").is_none());
}

#[test]
fn api_without_endpoint_set() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .arg("api")
        .assert()
        .success()
        .stdout(contains("No API endpoint set."));
}

#[test]
fn api_shows_saved_endpoint_as_json() {
    let home = home_with_session(&logged_in("password"));
    let output = stratus(home.path())
        .args(["api", "--format", "json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(shown["api_endpoint"], "https://api.example.invalid");
    assert_eq!(shown["organization"], "my-org");
    assert_eq!(shown["logged_in"], true);
}

#[test]
fn unreachable_insecure_endpoint_still_prints_warning() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .args(["api", "http://127.0.0.1:1", "--timeout", "5"])
        .assert()
        .code(1)
        .stderr(contains("Insecure http API endpoint").and(contains("FAILED")));
    assert!(!config_path(home.path()).exists());
}

#[test]
fn resource_commands_require_login() {
    let home = tempdir().expect("tempdir");
    for args in [
        vec!["service-brokers"],
        vec!["service-broker", "my-broker"],
        vec!["buildpacks"],
        vec!["create-buildpack", "go_buildpack", "1"],
        vec!["target"],
    ] {
        stratus(home.path())
            .args(&args)
            .assert()
            .code(1)
            .stderr(contains("Not logged in."));
    }
}

#[test]
fn space_scoped_broker_needs_a_targeted_space() {
    let home = home_with_session(&logged_in("password"));
    stratus(home.path())
        .args([
            "create-service-broker",
            "my-broker",
            "user",
            "pass",
            "https://broker.example.com",
            "--space-scoped",
        ])
        .assert()
        .code(1)
        .stderr(contains("No space targeted."));
}

#[test]
fn help_succeeds() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("create-service-broker"));
}

#[test]
fn unknown_subcommand_exits_with_one() {
    let home = tempdir().expect("tempdir");
    stratus(home.path())
        .arg("frobnicate")
        .assert()
        .code(1);
}
