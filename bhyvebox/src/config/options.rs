//! Host-level options for bhyvebox.

use crate::constants::envs as const_envs;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the per-user state directory under `$HOME`.
pub const BHYVEBOX_DIR: &str = ".bhyvebox";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BhyveboxOptions {
    /// State directory for lock files.
    pub home_dir: PathBuf,

    /// ZFS pool (or parent dataset, e.g. `zroot/guests`) holding guests.
    ///
    /// When unset the host must report exactly one pool; see
    /// [`crate::storage::resolve_pool`].
    pub pool: Option<String>,

    /// Directory under which guest datasets are mounted.
    ///
    /// ZFS mounts `tank/guest` at `/tank/guest` by default, so this is `/`
    /// on a stock host.
    pub mount_root: PathBuf,
}

impl Default for BhyveboxOptions {
    fn default() -> Self {
        let home_dir = std::env::var(const_envs::BHYVEBOX_HOME)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let mut path = home_dir().unwrap_or_else(|| PathBuf::from("."));
                path.push(BHYVEBOX_DIR);
                path
            });

        let pool = std::env::var(const_envs::BHYVEBOX_POOL)
            .ok()
            .filter(|p| !p.is_empty());

        Self {
            home_dir,
            pool,
            mount_root: PathBuf::from("/"),
        }
    }
}

impl BhyveboxOptions {
    /// Per-guest lock files: `<home>/locks`.
    pub fn locks_dir(&self) -> PathBuf {
        self.home_dir.join("locks")
    }
}
