use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const CONFIG: &str = "\
exclusions: [legacy]
commonDashboards:
  - localFolder: dashboards/common
    grafanaFolder: Common
customDashboards:
  localFolder: dashboards/custom
  grafanaFolder: ''
customStack: acme-custom
testStack: acme-test
tags: [managed]
idSuffix: -pr-1
";

fn dashpub_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dashpub"));
    cmd.current_dir(dir)
        .env_remove("GRAFANA_CLOUD_TOKEN")
        .env("NO_COLOR", "1");
    cmd
}

fn workspace_with_config() -> TempDir {
    let dir = TempDir::new().expect("workspace");
    fs::write(dir.path().join("publisher-config.yaml"), CONFIG).expect("write config");
    fs::create_dir_all(dir.path().join("dashboards/common")).expect("mkdir");
    dir
}

#[test]
fn publish_without_token_is_a_no_op() {
    let dir = workspace_with_config();
    dashpub_cmd(dir.path())
        .args(["publish", "--all"])
        .assert()
        .success()
        .stderr(contains("GRAFANA_CLOUD_TOKEN not set"));
}

#[test]
fn publish_with_missing_config_fails() {
    let dir = TempDir::new().expect("workspace");
    dashpub_cmd(dir.path())
        .arg("publish")
        .assert()
        .failure()
        .stderr(contains("failed to load publisher config"));
}

#[test]
fn publish_with_malformed_config_fails() {
    let dir = TempDir::new().expect("workspace");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "commonDashboards: [unclosed\n").expect("write");
    dashpub_cmd(dir.path())
        .args(["publish", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("failed to parse"));
}

#[test]
fn check_lists_bindings() {
    let dir = workspace_with_config();
    dashpub_cmd(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("acme-test"))
        .stdout(contains("dashboards/common"))
        .stdout(contains("not configured"))
        .stdout(contains("-pr-1"));
}

#[test]
fn check_reports_missing_local_folder() {
    let dir = workspace_with_config();
    fs::remove_dir_all(dir.path().join("dashboards/common")).expect("rm");
    dashpub_cmd(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("local folder missing"));
}

#[test]
fn check_missing_config_fails() {
    let dir = TempDir::new().expect("workspace");
    dashpub_cmd(dir.path())
        .args(["check", "--config", "nope.yaml"])
        .assert()
        .failure()
        .stderr(contains("nope.yaml"));
}

#[test]
fn uid_is_deterministic() {
    let dir = TempDir::new().expect("workspace");
    let first = dashpub_cmd(dir.path())
        .args(["uid", "--title", "Service Overview"])
        .assert()
        .success();
    let first = String::from_utf8(first.get_output().stdout.clone()).expect("utf8");

    dashpub_cmd(dir.path())
        .args(["uid", "--title", "Service Overview"])
        .assert()
        .success()
        .stdout(predicate::str::diff(first.clone()));
    assert_eq!(first.trim().len(), 40);
}

#[test]
fn uid_keeps_provided_uid_with_suffix() {
    let dir = TempDir::new().expect("workspace");
    dashpub_cmd(dir.path())
        .args(["uid", "--uid", "x", "--suffix", "-pr-1"])
        .assert()
        .success()
        .stdout("x-pr-1\n");
}

#[test]
fn uid_requires_title_or_uid() {
    let dir = TempDir::new().expect("workspace");
    dashpub_cmd(dir.path())
        .arg("uid")
        .assert()
        .failure()
        .stderr(contains("--title").and(contains("required")));
}

#[test]
fn stacks_without_token_fails() {
    let dir = workspace_with_config();
    dashpub_cmd(dir.path())
        .arg("stacks")
        .assert()
        .failure()
        .stderr(contains("GRAFANA_CLOUD_TOKEN is not set"));
}
