//! Deterministic dataset and file layout of one guest.
//!
//! ```text
//! <pool>/<uuid>               dataset, mounted at <mount_root>/<pool>/<uuid>
//! ├── firmware                dataset
//! ├── iso                     dataset
//! ├── disk0                   volume, /dev/zvol/<pool>/<uuid>/disk0
//! ├── config.json             persisted VmConfig
//! └── device.map              "(hd0) /dev/zvol/<pool>/<uuid>/disk0"
//! ```

use crate::constants::{datasets, filenames};
use std::path::{Path, PathBuf};

/// Whether a guest sub-path is a filesystem dataset or a block volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Filesystem,
    Volume,
}

/// One ZFS object the guest needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestDataset {
    pub name: String,
    pub kind: DatasetKind,
}

/// Every path belonging to a guest, derived from pool and UUID only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuestLayout {
    pool: String,
    uuid: String,
    mount_root: PathBuf,
}

impl GuestLayout {
    pub fn new(pool: impl Into<String>, uuid: impl Into<String>, mount_root: impl Into<PathBuf>) -> Self {
        let pool = pool.into().trim_end_matches('/').to_string();
        Self {
            pool,
            uuid: uuid.into(),
            mount_root: mount_root.into(),
        }
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Root dataset: `<pool>/<uuid>`.
    pub fn dataset(&self) -> String {
        format!("{}/{}", self.pool, self.uuid)
    }

    fn child(&self, name: &str) -> String {
        format!("{}/{}", self.dataset(), name)
    }

    pub fn firmware_dataset(&self) -> String {
        self.child(datasets::FIRMWARE)
    }

    pub fn iso_dataset(&self) -> String {
        self.child(datasets::ISO)
    }

    pub fn disk_dataset(&self) -> String {
        self.child(datasets::DISK0)
    }

    /// The four objects in creation order: root, firmware, iso, disk0.
    pub fn datasets(&self) -> Vec<GuestDataset> {
        vec![
            GuestDataset {
                name: self.dataset(),
                kind: DatasetKind::Filesystem,
            },
            GuestDataset {
                name: self.firmware_dataset(),
                kind: DatasetKind::Filesystem,
            },
            GuestDataset {
                name: self.iso_dataset(),
                kind: DatasetKind::Filesystem,
            },
            GuestDataset {
                name: self.disk_dataset(),
                kind: DatasetKind::Volume,
            },
        ]
    }

    /// Where the root dataset is mounted on the host.
    pub fn guest_path(&self) -> PathBuf {
        self.mount_root.join(self.dataset())
    }

    pub fn config_path(&self) -> PathBuf {
        self.guest_path().join(filenames::CONFIG)
    }

    pub fn device_map_path(&self) -> PathBuf {
        self.guest_path().join(filenames::DEVICE_MAP)
    }

    /// Device node ZFS creates for the `disk0` volume.
    pub fn zvol_device_path(&self) -> PathBuf {
        Path::new(datasets::ZVOL_DEV_ROOT).join(self.disk_dataset())
    }

    /// The single device map line handed to grub-bhyve.
    pub fn device_map_line(&self) -> String {
        format!(
            "({}) {}",
            datasets::BOOT_DISK_ID,
            self.zvol_device_path().display()
        )
    }
}
