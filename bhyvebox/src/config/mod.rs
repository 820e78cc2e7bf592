//! Guest and host configuration.

mod keys;
pub mod options;
pub mod store;
mod vm;

pub use keys::ConfigKey;
pub use options::BhyveboxOptions;
pub use vm::{VmConfig, parse_size, validate_uuid};
