//! Storage pool abstraction.

use crate::errors::BhyveboxResult;

/// The subset of ZFS the provisioner and orchestrator rely on.
///
/// [`super::ZfsCli`] drives the real `zfs`/`zpool` commands; tests swap in
/// a directory-backed fake.
pub trait ZfsBackend {
    /// Names of imported pools, in the order the host reports them.
    fn list_pools(&self) -> BhyveboxResult<Vec<String>>;

    /// Whether a dataset or volume with this exact name exists.
    fn dataset_exists(&self, name: &str) -> BhyveboxResult<bool>;

    /// Create a filesystem dataset. Parents must already exist.
    fn create_filesystem(&self, name: &str) -> BhyveboxResult<()>;

    /// Create a block volume of `size` (ZFS size notation).
    fn create_volume(&self, name: &str, size: &str) -> BhyveboxResult<()>;
}
