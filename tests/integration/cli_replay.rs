#![allow(missing_docs)]

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::tempdir;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[test]
fn generate_then_replay_round_trip() -> Result<()> {
    let dir = tempdir()?;
    let log = dir.path().join("trace.log");

    cargo_bin_cmd!("cli")
        .arg("generate")
        .arg(&log)
        .args(["--accounts", "40", "--blocks", "10", "--tx-per-block", "5"])
        .assert()
        .success();

    let metrics = dir.path().join("metrics.txt");
    let output = cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(&log)
        .arg("--output")
        .arg(&metrics)
        .args(["--partitions", "2", "--period", "100", "--strategy", "hash"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output)?;
    assert!(stdout.contains("strategy=hash"), "got: {stdout}");
    assert!(metrics.exists());
    Ok(())
}

#[test]
fn default_output_name_follows_convention() -> Result<()> {
    let dir = tempdir()?;
    let log = dir.path().join("trace.log");
    fs::write(&log, "G 1\nB 0 1000\nB 1 9999\n")?;

    cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(&log)
        .arg("--output-dir")
        .arg(dir.path())
        .args(["--partitions", "2", "--period", "500", "--strategy", "hash"])
        .assert()
        .success();

    assert!(dir
        .path()
        .join("edge_cut_evolution_partitions_2_period_500_hash.txt")
        .exists());
    Ok(())
}

#[test]
fn json_format_emits_a_summary_object() -> Result<()> {
    let dir = tempdir()?;
    let log = dir.path().join("trace.log");
    fs::write(&log, "G 1\nT 1 0 3 1 1 2 4\nB 0 1000\n")?;
    let metrics = dir.path().join("metrics.txt");

    let output = cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(&log)
        .arg("--output")
        .arg(&metrics)
        .args(["--partitions", "2", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output)?;
    assert_eq!(json["strategy"], "hash");
    assert_eq!(json["partitions"], 2);
    assert!(json["balance"].is_array());
    Ok(())
}

#[test]
fn corrupt_log_fails_with_nonzero_status() -> Result<()> {
    let dir = tempdir()?;
    let log = dir.path().join("trace.log");
    fs::write(&log, "G 1\nQ nonsense\n")?;
    let metrics = dir.path().join("metrics.txt");

    let output = cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(&log)
        .arg("--output")
        .arg(&metrics)
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output)?;
    assert!(stderr.contains("error:"), "got: {stderr}");
    assert!(stderr.contains("unknown record tag"), "got: {stderr}");
    Ok(())
}

#[test]
fn missing_input_fails_before_processing() -> Result<()> {
    let dir = tempdir()?;
    cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(dir.path().join("does_not_exist.log"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn zero_partitions_rejected_up_front() -> Result<()> {
    let dir = tempdir()?;
    let log = dir.path().join("trace.log");
    fs::write(&log, "G 1\n")?;
    let output = cargo_bin_cmd!("cli")
        .arg("replay")
        .arg(&log)
        .args(["--partitions", "0"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output)?;
    assert!(stderr.contains("partition count"), "got: {stderr}");
    Ok(())
}
