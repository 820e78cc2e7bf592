#![allow(dead_code)]

use assert_cmd::Command;
use std::time::Duration;
use tempfile::TempDir;

/// Isolated home and an empty PATH, so no host zfs/bhyve is ever reached.
pub struct TestContext {
    pub home: TempDir,
    pub empty_path: TempDir,
}

impl TestContext {
    pub fn new_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_bhyvebox");
        let mut cmd = Command::new(bin_path);
        cmd.timeout(Duration::from_secs(30));
        cmd.env_remove("BHYVEBOX_POOL");
        cmd.env_remove("RUST_LOG");
        cmd.env("PATH", self.empty_path.path());
        cmd.arg("--home").arg(self.home.path());
        cmd
    }
}

pub fn bhyvebox() -> TestContext {
    TestContext {
        home: TempDir::new().expect("Failed to create temp home"),
        empty_path: TempDir::new().expect("Failed to create empty PATH dir"),
    }
}
