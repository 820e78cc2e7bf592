//! Guest dataset provisioning and pool selection.

use super::backend::ZfsBackend;
use super::layout::{DatasetKind, GuestLayout};
use crate::errors::{BhyveboxError, BhyveboxResult};

/// Creates a guest's datasets and device map.
pub struct Provisioner<'a> {
    backend: &'a dyn ZfsBackend,
}

impl<'a> Provisioner<'a> {
    pub fn new(backend: &'a dyn ZfsBackend) -> Self {
        Self { backend }
    }

    /// Create every missing dataset of `layout`, then write `device.map`.
    ///
    /// Existing datasets are left untouched, so calling this again after a
    /// partial failure finishes the job. Nothing is rolled back.
    pub fn provision(&self, layout: &GuestLayout, disk_size: &str) -> BhyveboxResult<()> {
        for dataset in layout.datasets() {
            let exists = self
                .backend
                .dataset_exists(&dataset.name)
                .map_err(|e| provisioning_error(&dataset.name, e))?;
            if exists {
                tracing::debug!(dataset = %dataset.name, "Dataset already exists");
                continue;
            }

            let created = match dataset.kind {
                DatasetKind::Filesystem => self.backend.create_filesystem(&dataset.name),
                DatasetKind::Volume => self.backend.create_volume(&dataset.name, disk_size),
            };
            created.map_err(|e| provisioning_error(&dataset.name, e))?;
            tracing::info!(dataset = %dataset.name, kind = ?dataset.kind, "Created dataset");
        }

        self.write_device_map(layout)
    }

    fn write_device_map(&self, layout: &GuestLayout) -> BhyveboxResult<()> {
        let path = layout.device_map_path();
        let line = format!("{}\n", layout.device_map_line());
        std::fs::write(&path, line).map_err(|e| BhyveboxError::Provisioning {
            path: path.display().to_string(),
            message: format!("failed to write device map: {}", e),
        })?;
        tracing::debug!(path = %path.display(), "Wrote device map");
        Ok(())
    }
}

fn provisioning_error(dataset: &str, err: BhyveboxError) -> BhyveboxError {
    BhyveboxError::Provisioning {
        path: dataset.to_string(),
        message: err.to_string(),
    }
}

/// Decide which pool (or parent dataset) guests live under.
///
/// An explicit `configured` value is accepted if its first component is a
/// pool the host reports. Without one, the host must report exactly one
/// pool; several pools are an error rather than a silent pick.
pub fn resolve_pool(configured: Option<&str>, backend: &dyn ZfsBackend) -> BhyveboxResult<String> {
    let pools = backend.list_pools()?;

    if let Some(configured) = configured {
        let configured = configured.trim().trim_end_matches('/');
        let root = configured.split('/').next().unwrap_or_default();
        if root.is_empty() {
            return Err(BhyveboxError::Config("pool must not be empty".into()));
        }
        if !pools.iter().any(|p| p == root) {
            return Err(BhyveboxError::Config(format!(
                "pool '{}' not found (available: {})",
                root,
                display_pools(&pools)
            )));
        }
        return Ok(configured.to_string());
    }

    match pools.as_slice() {
        [] => Err(BhyveboxError::Config("no ZFS pools found on this host".into())),
        [only] => {
            tracing::info!(pool = %only, "Using the only available pool");
            Ok(only.clone())
        }
        _ => Err(BhyveboxError::Config(format!(
            "multiple pools available ({}); choose one with --pool or BHYVEBOX_POOL",
            display_pools(&pools)
        ))),
    }
}

fn display_pools(pools: &[String]) -> String {
    if pools.is_empty() {
        "none".to_string()
    } else {
        pools.join(", ")
    }
}
