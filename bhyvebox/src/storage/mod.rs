//! ZFS-backed guest storage.

mod backend;
mod layout;
mod provision;
mod zfs;

pub use backend::ZfsBackend;
pub use layout::{DatasetKind, GuestDataset, GuestLayout};
pub use provision::{Provisioner, resolve_pool};
pub use zfs::ZfsCli;
