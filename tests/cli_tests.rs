mod common;
use assert_cmd::cargo_bin_cmd;
use common::{Sandbox, URL_A, URL_B};
use predicates::prelude::*;
use std::fs;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn test_init_creates_database() {
    let sb = Sandbox::new();

    sb.lv()
        .args(["--test", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    assert!(std::path::Path::new(&sb.db).exists());
    // test mode never writes the config file
    assert!(!sb.path("linkvault.conf").exists());
}

#[test]
fn test_capture_then_list() {
    let sb = Sandbox::new();
    sb.init();

    sb.lv()
        .args(["capture", URL_A, "--name", "Estimate A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate Saved!"));

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate A"))
        .stdout(predicate::str::contains(URL_A))
        .stdout(predicate::str::contains("Mode: Local Storage"));
}

#[test]
fn test_same_link_is_saved_once() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, "Estimate A");

    sb.lv()
        .args(["capture", URL_A, "--name", "Another name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Link Already Saved"));

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Another name").not())
        .stdout(predicate::str::contains(URL_A).count(1));
}

#[test]
fn test_capture_without_name_uses_fallback() {
    let sb = Sandbox::new();
    sb.init();

    sb.lv().args(["capture", URL_A]).assert().success();

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Untitled Estimate"));
}

#[test]
fn test_blank_capture_fails_and_stores_nothing() {
    let sb = Sandbox::new();
    sb.init();

    sb.lv().args(["capture", "   "]).assert().failure();

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates saved yet."));
}

#[test]
fn test_list_is_newest_first() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, "Estimate A");
    sleep(Duration::from_millis(20));
    sb.capture(URL_B, "Estimate B");

    let out = sb.lv().arg("list").output().expect("run list");
    let stdout = String::from_utf8_lossy(&out.stdout);

    let a = stdout.find("Estimate A").expect("A listed");
    let b = stdout.find("Estimate B").expect("B listed");
    assert!(b < a, "B should come before A:\n{stdout}");
}

#[test]
fn test_del_with_yes_removes_one() {
    let sb = Sandbox::new();
    sb.init();
    let id_a = sb.capture(URL_A, "Estimate A");
    sb.capture(URL_B, "Estimate B");

    sb.lv()
        .args(["del", &id_a, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted (1 left)"));

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate A").not())
        .stdout(predicate::str::contains("Estimate B"));
}

#[test]
fn test_del_asks_for_confirmation() {
    let sb = Sandbox::new();
    sb.init();
    let id_a = sb.capture(URL_A, "Estimate A");

    sb.lv()
        .args(["del", &id_a])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    sb.lv()
        .args(["del", &id_a])
        .write_stdin("y\n")
        .assert()
        .success();

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates saved yet."));
}

#[test]
fn test_del_unknown_id_is_a_warning() {
    let sb = Sandbox::new();
    sb.init();

    sb.lv()
        .args(["del", "123-doesnotexist", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved estimate with id"));
}

#[test]
fn test_clear_empties_the_store() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, "Estimate A");
    sb.capture(URL_B, "Estimate B");

    sb.lv().args(["clear", "--yes"]).assert().success();

    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates saved yet."));
}

#[test]
fn test_export_csv_escapes_quotes() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, r#"Joe "Bot" Estimate"#);
    sb.capture(URL_B, "Plain");

    let out = sb.path("estimates.csv");
    let out_s = out.to_string_lossy().to_string();

    sb.lv()
        .args(["export", "--format", "csv", "--file", &out_s])
        .assert()
        .success()
        .stdout(predicate::str::contains("CSV export completed"));

    let content = fs::read_to_string(&out).expect("read exported csv");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Timestamp,Name,URL");
    assert!(content.contains(r#""Joe ""Bot"" Estimate""#));
}

#[test]
fn test_export_json() {
    let sb = Sandbox::new();
    sb.init();
    let id = sb.capture(URL_A, "Estimate A");

    let out = sb.path("estimates.json");
    let out_s = out.to_string_lossy().to_string();

    sb.lv()
        .args(["export", "--format", "json", "--file", &out_s])
        .assert()
        .success();

    let content = fs::read_to_string(&out).expect("read exported json");
    let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(value[0]["id"], id.as_str());
    assert_eq!(value[0]["url"], URL_A);
}

#[test]
fn test_export_empty_writes_nothing() {
    let sb = Sandbox::new();
    sb.init();
    let out = sb.path("empty.csv");
    let out_s = out.to_string_lossy().to_string();

    sb.lv()
        .args(["export", "--file", &out_s])
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates to download."));

    assert!(!out.exists());
}

#[test]
fn test_export_existing_file_needs_force() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, "Estimate A");
    let out_s = sb.write("existing.csv", "old");

    sb.lv()
        .args(["export", "--file", &out_s])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export cancelled"));
    assert_eq!(fs::read_to_string(&out_s).unwrap(), "old");

    sb.lv()
        .args(["export", "--file", &out_s, "--force"])
        .assert()
        .success();
    assert!(fs::read_to_string(&out_s).unwrap().starts_with("Timestamp,Name,URL"));
}

#[test]
fn test_log_records_operations() {
    let sb = Sandbox::new();
    sb.init();
    let id = sb.capture(URL_A, "Estimate A");
    sb.capture(URL_A, "Estimate A");
    sb.lv().args(["del", &id, "--yes"]).assert().success();

    sb.lv()
        .args(["log", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("migration_applied"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("capture_duplicate"))
        .stdout(predicate::str::contains(format!("({id})")));
}

#[test]
fn test_config_print_masks_api_key() {
    let sb = Sandbox::new();
    sb.write(
        "linkvault.conf",
        "backend:\n  endpoint: http://127.0.0.1:9/estimates\n  api_key: supersecret1234\n",
    );

    sb.lv()
        .args(["config", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****1234"))
        .stdout(predicate::str::contains("supersecret").not());
}

#[test]
fn test_config_check_reports_missing_fields() {
    let sb = Sandbox::new();
    sb.write("linkvault.conf", "slot: aws_saved_estimates_v2\n");

    sb.lv()
        .args(["config", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing fields"))
        .stdout(predicate::str::contains("selectors"));
}

#[test]
fn test_custom_slot_is_isolated() {
    let sb = Sandbox::new();
    sb.init();
    sb.capture(URL_A, "Estimate A");

    sb.write("linkvault.conf", "slot: other_slot_v1\n");
    sb.lv()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates saved yet."));
}

#[test]
fn test_list_works_before_init() {
    let sb = Sandbox::new();
    let home = sb.path("never-initialized");

    let lv = || {
        let mut cmd = cargo_bin_cmd!("linkvault");
        cmd.env("LINKVAULT_HOME", &home)
            .env_remove("LINKVAULT_ENDPOINT")
            .env_remove("LINKVAULT_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    };

    lv().arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No estimates saved yet."))
        .stdout(predicate::str::contains("Mode: Local Storage"));

    lv().args(["capture", URL_A, "--name", "Estimate A"])
        .assert()
        .success();

    lv().arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate A"));

    assert!(home.join("linkvault.sqlite").exists());
}
