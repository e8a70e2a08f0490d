use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn locflow(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("locflow").expect("binary built");
    cmd.current_dir(dir).env("NO_COLOR", "1");
    cmd
}

fn write_project(dir: &Path) {
    std::fs::write(
        dir.join("locflow.toml"),
        r#"source_locale = "en"
target_locales = ["de", "fr"]

[[buckets]]
format = "json"
include = ["locales/[locale].json"]
"#,
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("locales")).unwrap();
    std::fs::write(
        dir.join("locales/en.json"),
        "{\n  \"greeting\": \"Hello\",\n  \"farewell\": \"Bye\"\n}\n",
    )
    .unwrap();
}

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let dir = tempdir().unwrap();

    locflow(dir.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config written"));
    assert!(dir.path().join("locflow.toml").exists());

    locflow(dir.path()).args(["init"]).assert().failure();

    locflow(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn plan_lists_one_task_per_locale_pair() {
    let dir = tempdir().unwrap();
    write_project(dir.path());

    locflow(dir.path())
        .args(["plan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 task(s)"))
        .stdout(predicate::str::contains("en → de"))
        .stdout(predicate::str::contains("en → fr"));
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = tempdir().unwrap();
    write_project(dir.path());

    let output = locflow(dir.path())
        .args(["plan", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 2);
    assert_eq!(items[0]["path_pattern"], "locales/[locale].json");
}

#[test]
fn run_translates_then_skips() {
    let dir = tempdir().unwrap();
    write_project(dir.path());

    locflow(dir.path())
        .args(["run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 succeeded"));

    let de = std::fs::read_to_string(dir.path().join("locales/de.json")).unwrap();
    assert!(de.contains('⟦'), "pseudo-localized value expected: {de}");
    let value: serde_json::Value = serde_json::from_str(&de).unwrap();
    assert!(value.get("greeting").is_some());
    assert!(dir.path().join("locflow.lock").exists());

    // Unchanged source: everything skips, the file stays byte-identical.
    locflow(dir.path())
        .args(["run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 skipped"));
    let de_again = std::fs::read_to_string(dir.path().join("locales/de.json")).unwrap();
    assert_eq!(de, de_again);
}

#[test]
fn partial_locale_run_leaves_fingerprints_alone() {
    let dir = tempdir().unwrap();
    write_project(dir.path());

    locflow(dir.path())
        .args(["run", "--locale", "de"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 succeeded"));

    assert!(dir.path().join("locales/de.json").exists());
    assert!(!dir.path().join("locales/fr.json").exists());
    assert!(
        !dir.path().join("locflow.lock").exists(),
        "partial runs must not record fingerprints"
    );
}

#[test]
fn delta_reports_added_keys_before_first_run() {
    let dir = tempdir().unwrap();
    write_project(dir.path());

    locflow(dir.path())
        .args(["delta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 added"))
        .stdout(predicate::str::contains("+ greeting"));

    locflow(dir.path()).args(["run"]).assert().success();

    locflow(dir.path())
        .args(["delta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 added"))
        .stdout(predicate::str::contains("2 unchanged"));
}

#[test]
fn missing_config_is_a_planning_error() {
    let dir = tempdir().unwrap();
    locflow(dir.path())
        .args(["run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("source locale"));
}

#[test]
fn unknown_locale_filter_fails_before_execution() {
    let dir = tempdir().unwrap();
    write_project(dir.path());
    locflow(dir.path())
        .args(["run", "--locale", "xx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not one of the configured"));
}
