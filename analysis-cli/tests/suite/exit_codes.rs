#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

/// A file with the container extension that no reader accepts.
fn write_unreadable_container(path: &Path) {
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(path, b"not an hdf5 file").expect("write container");
}

fn command(program: &str, workdir: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.current_dir(workdir).env_remove("ALOHA_META");
    cmd
}

fn analysis(workdir: &Path) -> Command {
    command(env!("CARGO_BIN_EXE_analysis"), workdir)
}

fn all_analysis(workdir: &Path) -> Command {
    command(env!("CARGO_BIN_EXE_all-analysis"), workdir)
}

#[test]
fn analysis_exits_non_zero_when_folder_has_no_containers() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("notes.txt"), "no episodes here").expect("write notes");

    analysis(dir.path())
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(contains("no valid episode containers"));
}

#[test]
fn analysis_allow_empty_writes_a_totals_only_csv() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("out");

    analysis(dir.path())
        .arg(dir.path())
        .arg("--allow-empty")
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(contains("Episodes analyzed: 0"));

    let csv = fs::read_to_string(out.join("hdf5_analysis_summary.csv")).expect("csv written");
    let first_cells: Vec<&str> = csv.lines().filter_map(|l| l.split(',').next()).collect();
    assert_eq!(first_cells, vec!["task_name", "TOTAL"]);
}

#[test]
fn negative_tolerance_is_rejected() {
    let dir = tempdir().expect("tempdir");

    analysis(dir.path())
        .arg(dir.path())
        .arg("--tolerance=-0.5")
        .assert()
        .failure()
        .stderr(contains("--tolerance"));
}

#[test]
fn all_analysis_exits_non_zero_without_candidate_folders() {
    let root = tempdir().expect("tempdir");
    fs::create_dir_all(root.path().join("docs")).expect("create dir");

    all_analysis(root.path())
        .arg(root.path())
        .assert()
        .failure()
        .stderr(contains("no candidate folders"));
}

#[cfg(feature = "hdf5")]
#[test]
fn analysis_skips_unreadable_containers_when_empty_is_allowed() {
    let dir = tempdir().expect("tempdir");
    write_unreadable_container(&dir.path().join("episode_0.hdf5"));

    analysis(dir.path())
        .arg(dir.path())
        .arg("--allow-empty")
        .assert()
        .success()
        .stdout(contains("Episodes skipped: 1"));
}

#[cfg(feature = "hdf5")]
#[test]
fn all_analysis_writes_csv_and_json_into_data_by_default() {
    let root = tempdir().expect("tempdir");
    write_unreadable_container(&root.path().join("corpus/pick/episode_0.hdf5"));

    all_analysis(root.path())
        .arg(root.path().join("corpus"))
        .arg("--allow-empty")
        .assert()
        .success();

    let data = root.path().join("data");
    assert!(data.join("summary_hdf5.csv").is_file());
    let json = fs::read_to_string(data.join("hdf5_total_summary.json")).expect("json written");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["folder_count"], serde_json::Value::from(1));
    assert_eq!(value["total_frame_count"], serde_json::Value::from(0));
    assert_eq!(value["total_time_hours"], serde_json::Value::from(0.0));
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn analysis_without_hdf5_support_fails_loudly() {
    let dir = tempdir().expect("tempdir");
    write_unreadable_container(&dir.path().join("episode_0.hdf5"));

    analysis(dir.path())
        .arg(dir.path())
        .arg("--allow-empty")
        .assert()
        .failure()
        .stderr(contains("no HDF5 support"));
}

#[cfg(not(feature = "hdf5"))]
#[test]
fn all_analysis_without_hdf5_support_fails_loudly() {
    let root = tempdir().expect("tempdir");
    write_unreadable_container(&root.path().join("corpus/pick/episode_0.hdf5"));

    all_analysis(root.path())
        .arg(root.path().join("corpus"))
        .arg("--allow-empty")
        .assert()
        .failure()
        .stderr(contains("no HDF5 support"));
    assert!(!root.path().join("data").exists());
}

#[test]
fn unreadable_meta_config_is_fatal() {
    let dir = tempdir().expect("tempdir");
    write_unreadable_container(&dir.path().join("episode_0.hdf5"));
    let meta = dir.path().join("meta.json");
    fs::write(&meta, "{ not json").expect("write meta");

    analysis(dir.path())
        .arg(dir.path())
        .arg("--meta")
        .arg(&meta)
        .assert()
        .failure()
        .stderr(contains("failed to load metadata config"));
}
