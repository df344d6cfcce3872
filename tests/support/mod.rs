#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use taskboard::config::Config;
use taskboard::Board;
use tempfile::TempDir;

/// A throwaway data directory plus helpers to drive `tb` against it.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn key_file(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    /// Library handle on the same data directory the CLI uses.
    pub fn open(&self) -> Board {
        Board::open(Config::load_from_dir(self.dir.path())).expect("open board")
    }

    pub fn tb(&self) -> Command {
        let mut cmd = Command::cargo_bin("tb").expect("binary");
        cmd.env("TB_DATA_DIR", self.dir.path());
        cmd.env_remove("TB_CONFIG");
        cmd.env_remove("TB_PASSWORD");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn login(&self, username: &str) {
        self.tb()
            .args(["login", username, "--password", "pw"])
            .assert()
            .success();
    }

    /// Run a command with `--json` and return the `data` field.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .tb()
            .args(args)
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(value["status"], "success");
        value["data"].clone()
    }

    pub fn new_project(&self, name: &str) -> String {
        let data = self.json(&["project", "new", name]);
        data["id"].as_str().expect("project id").to_string()
    }

    pub fn new_task(&self, project: &str, title: &str, due: &str) -> String {
        let data = self.json(&["task", "new", project, title, "--due", due]);
        data["id"].as_str().expect("task id").to_string()
    }
}
