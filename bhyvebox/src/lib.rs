//! Provision and boot bhyve guests on ZFS.
//!
//! A [`VmConfig`] is persisted next to the guest's dataset at `create` time
//! and read back by each later `start`, which runs grub-bhyve and then bhyve
//! with argument lists compiled by [`builder`].

pub mod args;
pub mod boot;
pub mod builder;
pub mod config;
pub mod constants;
pub mod errors;
pub mod lock;
pub mod runtime;
pub mod storage;

pub use boot::{BootSequence, BootState};
pub use builder::{Command, Stage};
pub use config::{BhyveboxOptions, ConfigKey, VmConfig};
pub use errors::{BhyveboxError, BhyveboxResult};
pub use runtime::BhyveboxRuntime;
pub use storage::GuestLayout;
