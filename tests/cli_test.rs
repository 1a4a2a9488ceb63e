use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn mdtidy() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mdtidy");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_formats_directory() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("README.md");
    fs::write(&file, "Test\n===\n\n##No Space").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted 1/1 file"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "# Test\n\n## No Space\n");
}

#[test]
fn test_already_formatted() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("README.md"), "# Clean\n").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already formatted"));
}

#[test]
fn test_dry_run_with_verbose_listing() {
    let temp_dir = tempdir().unwrap();
    let file = temp_dir.path().join("doc.md");
    fs::write(&file, "***\n").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .arg("--dry-run")
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("would format doc.md"))
        .stdout(predicate::str::contains("horizontal-rule-style"))
        .stdout(predicate::str::contains("Would format 1/1 file"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "***\n");
}

#[test]
fn test_diff_output() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("doc.md"), "Title\n=====\n").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .args(["--dry-run", "--diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- doc.md"))
        .stdout(predicate::str::contains("-Title"))
        .stdout(predicate::str::contains("+# Title"));
}

#[test]
fn test_invalid_file_exits_one() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("good.md"), "# Good\n").unwrap();
    fs::write(temp_dir.path().join("bad.md"), [0xFF, 0xFE, 0x00]).unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.md"))
        .stderr(predicate::str::contains("invalid UTF-8"));
}

#[test]
fn test_missing_root_exits_two() {
    let temp_dir = tempdir().unwrap();

    mdtidy()
        .arg(temp_dir.path().join("absent"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("root directory error"));
}

#[test]
fn test_exclude_option_replaces_defaults() {
    let temp_dir = tempdir().unwrap();
    fs::create_dir_all(temp_dir.path().join("generated")).unwrap();
    fs::create_dir_all(temp_dir.path().join("node_modules")).unwrap();
    let generated = temp_dir.path().join("generated/api.md");
    let dependency = temp_dir.path().join("node_modules/readme.md");
    fs::write(&generated, "***\n").unwrap();
    fs::write(&dependency, "***\n").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .args(["-e", "generated/"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&generated).unwrap(), "***\n");
    assert_eq!(fs::read_to_string(&dependency).unwrap(), "---\n");
}

#[test]
fn test_json_output() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join("a.md"), "_x_\n").unwrap();
    fs::write(temp_dir.path().join("b.md"), "# B\n").unwrap();

    let output = mdtidy()
        .arg(temp_dir.path())
        .args(["--output", "json", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total_files"], 2);
    assert_eq!(report["files_skipped"], 1);
    assert_eq!(report["files_unchanged"], 1);
    assert_eq!(report["rule_stats"]["emphasis"], 1);
    assert_eq!(report["results"][0]["file"]["rel_path"], "a.md");
    assert_eq!(report["results"][0]["status"], "skipped");
}

#[test]
fn test_config_file_extends_exclusions() {
    let temp_dir = tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".mdtidy.toml"),
        "[global]\nextend-exclude = [\"drafts/\"]\n",
    )
    .unwrap();
    fs::create_dir_all(temp_dir.path().join("drafts")).unwrap();
    let draft = temp_dir.path().join("drafts/wip.md");
    fs::write(&draft, "***\n").unwrap();

    mdtidy().arg(temp_dir.path()).assert().success();
    assert_eq!(fs::read_to_string(&draft).unwrap(), "***\n");

    mdtidy().arg(temp_dir.path()).arg("--no-config").assert().success();
    assert_eq!(fs::read_to_string(&draft).unwrap(), "---\n");
}

#[test]
fn test_bad_config_exits_two() {
    let temp_dir = tempdir().unwrap();
    fs::write(temp_dir.path().join(".mdtidy.toml"), "[global]\nunknown = 1\n").unwrap();

    mdtidy()
        .arg(temp_dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load configuration"));
}
