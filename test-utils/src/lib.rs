//! Shared fixtures for bhyvebox tests.
//!
//! [`FakeZfs`] keeps datasets in memory and mirrors filesystem datasets as
//! directories under a temporary mount root, so persistence and the device
//! map work unchanged. [`RecordingRunner`] records commands instead of
//! executing them.

use bhyvebox::boot::{ProcessOutput, ProcessRunner};
use bhyvebox::storage::ZfsBackend;
use bhyvebox::{BhyveboxError, BhyveboxOptions, BhyveboxResult, BhyveboxRuntime, Command};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct ZfsState {
    filesystems: BTreeSet<String>,
    volumes: BTreeMap<String, String>,
    creates: Vec<String>,
    fail_on: Option<String>,
}

/// Directory-backed stand-in for the host's ZFS.
#[derive(Clone)]
pub struct FakeZfs {
    mount_root: PathBuf,
    pools: Vec<String>,
    state: Arc<Mutex<ZfsState>>,
}

impl FakeZfs {
    pub fn new(mount_root: impl Into<PathBuf>, pools: &[&str]) -> Self {
        Self {
            mount_root: mount_root.into(),
            pools: pools.iter().map(|p| p.to_string()).collect(),
            state: Arc::default(),
        }
    }

    /// Make the next create of `name` fail.
    pub fn fail_on(&self, name: impl Into<String>) {
        self.state.lock().fail_on = Some(name.into());
    }

    pub fn clear_failure(&self) {
        self.state.lock().fail_on = None;
    }

    /// Every successful create, in order. Volumes read `name@size`.
    pub fn creates(&self) -> Vec<String> {
        self.state.lock().creates.clone()
    }

    pub fn volume_size(&self, name: &str) -> Option<String> {
        self.state.lock().volumes.get(name).cloned()
    }

    /// All existing datasets and volumes, sorted.
    pub fn datasets(&self) -> Vec<String> {
        let state = self.state.lock();
        let mut all: Vec<String> = state
            .filesystems
            .iter()
            .chain(state.volumes.keys())
            .cloned()
            .collect();
        all.sort();
        all
    }

    fn check_failure(&self, state: &ZfsState, name: &str) -> BhyveboxResult<()> {
        if state.fail_on.as_deref() == Some(name) {
            return Err(BhyveboxError::Storage(format!(
                "cannot create '{}': injected failure",
                name
            )));
        }
        Ok(())
    }
}

impl ZfsBackend for FakeZfs {
    fn list_pools(&self) -> BhyveboxResult<Vec<String>> {
        Ok(self.pools.clone())
    }

    fn dataset_exists(&self, name: &str) -> BhyveboxResult<bool> {
        let state = self.state.lock();
        Ok(state.filesystems.contains(name) || state.volumes.contains_key(name))
    }

    fn create_filesystem(&self, name: &str) -> BhyveboxResult<()> {
        let mut state = self.state.lock();
        self.check_failure(&state, name)?;
        if !state.filesystems.insert(name.to_string()) {
            return Err(BhyveboxError::Storage(format!(
                "cannot create '{}': dataset already exists",
                name
            )));
        }
        std::fs::create_dir_all(self.mount_root.join(name))
            .map_err(|e| BhyveboxError::Storage(format!("mkdir {}: {}", name, e)))?;
        state.creates.push(name.to_string());
        Ok(())
    }

    fn create_volume(&self, name: &str, size: &str) -> BhyveboxResult<()> {
        let mut state = self.state.lock();
        self.check_failure(&state, name)?;
        if state.volumes.contains_key(name) {
            return Err(BhyveboxError::Storage(format!(
                "cannot create '{}': dataset already exists",
                name
            )));
        }
        state.volumes.insert(name.to_string(), size.to_string());
        state.creates.push(format!("{}@{}", name, size));
        Ok(())
    }
}

#[derive(Default)]
struct RunnerState {
    calls: Vec<Command>,
    script: VecDeque<ProcessOutput>,
}

/// Records every command and answers with scripted outputs.
///
/// Once the script is exhausted every command succeeds with no output.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    state: Arc<Mutex<RunnerState>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next command.
    pub fn push_exit(&self, code: i32, stderr: &str) {
        self.state.lock().script.push_back(ProcessOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<Command> {
        self.state.lock().calls.clone()
    }

    /// Binaries in call order.
    pub fn binaries(&self) -> Vec<PathBuf> {
        self.calls().iter().map(|c| c.binary().to_path_buf()).collect()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, command: &Command) -> BhyveboxResult<ProcessOutput> {
        let mut state = self.state.lock();
        state.calls.push(command.clone());
        Ok(state.script.pop_front().unwrap_or(ProcessOutput {
            code: Some(0),
            ..Default::default()
        }))
    }
}

/// Temporary home and mount root with fakes wired into a runtime.
pub struct TestContext {
    _temp_dir: TempDir,
    pub home_dir: PathBuf,
    pub mount_root: PathBuf,
    pub zfs: FakeZfs,
    pub runner: RecordingRunner,
}

impl TestContext {
    /// Single pool named `tank`.
    pub fn new() -> Self {
        Self::with_pools(&["tank"])
    }

    pub fn with_pools(pools: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let home_dir = temp_dir.path().join("home");
        let mount_root = temp_dir.path().join("mnt");
        std::fs::create_dir_all(&mount_root).expect("Failed to create mount root");
        for pool in pools {
            std::fs::create_dir_all(mount_root.join(pool)).expect("Failed to create pool dir");
        }

        Self {
            zfs: FakeZfs::new(&mount_root, pools),
            runner: RecordingRunner::new(),
            home_dir,
            mount_root,
            _temp_dir: temp_dir,
        }
    }

    pub fn options(&self, pool: Option<&str>) -> BhyveboxOptions {
        BhyveboxOptions {
            home_dir: self.home_dir.clone(),
            pool: pool.map(String::from),
            mount_root: self.mount_root.clone(),
        }
    }

    pub fn runtime(&self) -> BhyveboxRuntime {
        self.runtime_with_pool(None)
            .expect("Failed to create runtime")
    }

    pub fn runtime_with_pool(&self, pool: Option<&str>) -> BhyveboxResult<BhyveboxRuntime> {
        BhyveboxRuntime::with_backends(
            self.options(pool),
            Box::new(self.zfs.clone()),
            Box::new(self.runner.clone()),
        )
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
