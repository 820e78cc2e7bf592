//! Entry point tying storage, persistence, locking and boot together.

use crate::boot::{BootState, Orchestrator, ProcessRunner, SystemRunner};
use crate::builder::{self, Command, Stage};
use crate::config::{BhyveboxOptions, VmConfig, store, validate_uuid};
use crate::constants::filenames;
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::lock::GuestLock;
use crate::storage::{GuestLayout, Provisioner, ZfsBackend, ZfsCli, resolve_pool};

/// Guest lifecycle operations against one resolved pool.
pub struct BhyveboxRuntime {
    options: BhyveboxOptions,
    pool: String,
    backend: Box<dyn ZfsBackend>,
    runner: Box<dyn ProcessRunner>,
}

impl BhyveboxRuntime {
    /// Runtime backed by the host's `zfs` tools and real process execution.
    pub fn new(options: BhyveboxOptions) -> BhyveboxResult<Self> {
        Self::with_backends(options, Box::new(ZfsCli::new()), Box::new(SystemRunner))
    }

    /// Runtime with explicit storage and process backends.
    pub fn with_backends(
        options: BhyveboxOptions,
        backend: Box<dyn ZfsBackend>,
        runner: Box<dyn ProcessRunner>,
    ) -> BhyveboxResult<Self> {
        let pool = resolve_pool(options.pool.as_deref(), backend.as_ref())?;
        tracing::debug!(
            pool = %pool,
            home = %options.home_dir.display(),
            mount_root = %options.mount_root.display(),
            "Runtime ready"
        );
        Ok(Self {
            options,
            pool,
            backend,
            runner,
        })
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn options(&self) -> &BhyveboxOptions {
        &self.options
    }

    pub fn layout(&self, uuid: &str) -> GuestLayout {
        GuestLayout::new(&self.pool, uuid, &self.options.mount_root)
    }

    /// Provision storage for a new guest and persist its configuration.
    ///
    /// A UUID is generated when `config` has none, and an empty disk device
    /// defaults to the guest's zvol. The config file is only written once
    /// every dataset exists, and an existing one is never replaced; a create
    /// that failed during provisioning can simply be repeated. Returns the
    /// configuration as persisted.
    pub fn create(&self, mut config: VmConfig) -> BhyveboxResult<VmConfig> {
        config.ensure_uuid();
        config.validate()?;

        let layout = self.layout(&config.uuid);
        if config.disk_device.is_empty() {
            config.disk_device = layout.zvol_device_path().display().to_string();
        }

        let _lock = GuestLock::acquire(&self.options.locks_dir(), &config.uuid)?;
        if layout.config_path().exists() {
            return Err(BhyveboxError::Config(format!(
                "guest {} already exists",
                config.uuid
            )));
        }
        config.log_summary("Creating guest");

        Provisioner::new(self.backend.as_ref()).provision(&layout, &config.disk_size)?;
        store::save(&layout, &config)?;

        tracing::info!(uuid = %config.uuid, dataset = %layout.dataset(), "Guest created");
        Ok(config)
    }

    /// Boot a provisioned guest, blocking until bhyve exits.
    pub fn start(&self, uuid: &str) -> BhyveboxResult<BootState> {
        validate_uuid(uuid)?;
        let layout = self.layout(uuid);
        let _lock = GuestLock::acquire(&self.options.locks_dir(), uuid)?;

        let mut orchestrator = Orchestrator::new(self.backend.as_ref(), self.runner.as_ref());
        orchestrator.start(&layout)?;
        Ok(orchestrator.state().clone())
    }

    /// Both stage commands for a persisted guest, without running them.
    pub fn render(&self, uuid: &str) -> BhyveboxResult<Vec<(Stage, Command)>> {
        validate_uuid(uuid)?;
        let layout = self.layout(uuid);
        if !self.backend.dataset_exists(&layout.dataset())? {
            return Err(BhyveboxError::GuestNotFound(uuid.to_string()));
        }

        let config = store::load(&layout)?;
        [Stage::Bootloader, Stage::Hypervisor]
            .into_iter()
            .map(|stage| builder::build(stage, &config, &layout).map(|cmd| (stage, cmd)))
            .collect()
    }

    /// Configurations of every guest under the pool, ordered by name then UUID.
    ///
    /// Directories without a readable `config.json` are skipped with a
    /// warning.
    pub fn list(&self) -> BhyveboxResult<Vec<VmConfig>> {
        let pool_dir = self.options.mount_root.join(&self.pool);
        let entries = match std::fs::read_dir(&pool_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(BhyveboxError::Storage(format!(
                    "failed to read {}: {}",
                    pool_dir.display(),
                    e
                )));
            }
        };

        let mut guests = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| BhyveboxError::Storage(format!("failed to read dir entry: {}", e)))?;
            if !entry.path().join(filenames::CONFIG).is_file() {
                continue;
            }
            let uuid = entry.file_name().to_string_lossy().into_owned();
            match store::load(&self.layout(&uuid)) {
                Ok(config) => guests.push(config),
                Err(e) => tracing::warn!(uuid = %uuid, error = %e, "Skipping guest"),
            }
        }

        guests.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uuid.cmp(&b.uuid)));
        Ok(guests)
    }
}

impl std::fmt::Debug for BhyveboxRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BhyveboxRuntime")
            .field("pool", &self.pool)
            .field("options", &self.options)
            .finish()
    }
}
