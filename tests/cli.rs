use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("macrobank").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("macrobank"));
}

#[test]
fn build_rejects_invalid_date() {
    let mut cmd = Command::cargo_bin("macrobank").unwrap();
    cmd.args(["build", "--date", "2020", "--out", "ignored.csv"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("YYYY:YYYY"));
}

#[test]
fn build_rejects_inverted_date() {
    let mut cmd = Command::cargo_bin("macrobank").unwrap();
    cmd.args(["build", "--date", "2020:1990", "--out", "ignored.csv"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("start year is after end year"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn build_online_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("macro.csv");
    let mut cmd = Command::cargo_bin("macrobank").unwrap();
    cmd.args([
        "build",
        "--countries",
        "IDN,VNM",
        "--date",
        "2015:2023",
        "--out",
    ]);
    cmd.arg(&out);
    cmd.assert().success();
    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("country,iso3,year,gdp_growth_pct"));
}
