//! [`ZfsBackend`] implemented on top of the `zfs` and `zpool` commands.

use super::backend::ZfsBackend;
use crate::constants::binaries;
use crate::errors::{BhyveboxError, BhyveboxResult};
use std::process::{Command, Output, Stdio};

/// Drives the host's ZFS userland tools.
#[derive(Debug, Clone)]
pub struct ZfsCli {
    zfs: String,
    zpool: String,
}

impl Default for ZfsCli {
    fn default() -> Self {
        Self {
            zfs: binaries::ZFS.to_string(),
            zpool: binaries::ZPOOL.to_string(),
        }
    }
}

impl ZfsCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use alternative binaries, e.g. absolute paths or wrappers.
    pub fn with_binaries(zfs: impl Into<String>, zpool: impl Into<String>) -> Self {
        Self {
            zfs: zfs.into(),
            zpool: zpool.into(),
        }
    }

    fn run(&self, binary: &str, args: &[&str]) -> BhyveboxResult<Output> {
        tracing::debug!(binary, ?args, "Running storage command");
        Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BhyveboxError::Storage(format!("Failed to run {}: {}", binary, e)))
    }

    fn run_checked(&self, binary: &str, args: &[&str]) -> BhyveboxResult<Output> {
        let output = self.run(binary, args)?;
        if !output.status.success() {
            return Err(BhyveboxError::Storage(format!(
                "{} {} failed: {}",
                binary,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }
}

impl ZfsBackend for ZfsCli {
    fn list_pools(&self) -> BhyveboxResult<Vec<String>> {
        let output = self.run_checked(&self.zpool, &["list", "-H", "-o", "name"])?;
        Ok(parse_name_list(&String::from_utf8_lossy(&output.stdout)))
    }

    fn dataset_exists(&self, name: &str) -> BhyveboxResult<bool> {
        let output = self.run(&self.zfs, &["list", "-H", "-o", "name", name])?;
        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("does not exist") {
            Ok(false)
        } else {
            Err(BhyveboxError::Storage(format!(
                "Failed to probe dataset {}: {}",
                name,
                stderr.trim()
            )))
        }
    }

    fn create_filesystem(&self, name: &str) -> BhyveboxResult<()> {
        self.run_checked(&self.zfs, &["create", name])?;
        Ok(())
    }

    fn create_volume(&self, name: &str, size: &str) -> BhyveboxResult<()> {
        self.run_checked(&self.zfs, &["create", "-V", size, name])?;
        Ok(())
    }
}

/// One name per line, as printed by `-H -o name`.
fn parse_name_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
