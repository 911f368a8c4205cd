#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const URL_A: &str = "https://calculator.aws/#/estimate/abc";
pub const URL_B: &str = "https://calculator.aws/#/estimate/xyz";

/// Isolated home + database for one test.
pub struct Sandbox {
    pub dir: TempDir,
    pub db: String,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = dir
            .path()
            .join("linkvault_test.sqlite")
            .to_string_lossy()
            .to_string();
        Self { dir, db }
    }

    /// Binary invocation bound to this sandbox, always local.
    pub fn lv(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("linkvault");
        cmd.env("LINKVAULT_HOME", self.dir.path())
            .env_remove("LINKVAULT_ENDPOINT")
            .env_remove("LINKVAULT_API_KEY")
            .env_remove("RUST_LOG")
            .args(["--db", &self.db]);
        cmd
    }

    /// `init` in test mode (no config file written).
    pub fn init(&self) -> &Self {
        self.lv().args(["--test", "init"]).assert().success();
        self
    }

    /// Capture `url` and return the id printed for the new record.
    pub fn capture(&self, url: &str, name: &str) -> String {
        let out = self
            .lv()
            .args(["capture", url, "--name", name])
            .output()
            .expect("run capture");
        assert!(out.status.success(), "capture failed: {out:?}");
        id_from_output(&String::from_utf8_lossy(&out.stdout)).expect("id in capture output")
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    pub fn write(&self, file: &str, content: &str) -> String {
        let p = self.path(file);
        fs::write(&p, content).expect("write fixture");
        p.to_string_lossy().to_string()
    }
}

pub fn id_from_output(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("🆔 "))
        .map(|id| id.trim().to_string())
}
