//! grub-bhyve argument mapping.

use crate::args::Device;
use crate::config::{ConfigKey, VmConfig};
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::storage::GuestLayout;

/// Command-line order of the bootloader stage.
pub(super) const KEYS: &[ConfigKey] = &[
    ConfigKey::WireGuestMemory,
    ConfigKey::DiskDevice,
    ConfigKey::BootPartition,
    ConfigKey::SerialConsole1,
    ConfigKey::Ram,
    ConfigKey::Uuid,
];

pub(super) fn device_for(
    key: ConfigKey,
    config: &VmConfig,
    layout: &GuestLayout,
) -> BhyveboxResult<Device> {
    let device = match key {
        ConfigKey::WireGuestMemory => switch("-S", config.wire_guest_memory),
        // grub-bhyve sees the disk through the device map, not directly.
        ConfigKey::DiskDevice => Device::with_arg("-m", layout.device_map_path().display().to_string()),
        ConfigKey::BootPartition => optional_arg("-r", &config.boot_partition),
        ConfigKey::SerialConsole1 => optional_arg("-c", &config.serial_console1),
        ConfigKey::Ram => required_arg("-M", &config.ram)?,
        ConfigKey::Uuid => Device::positional(config.short_id()),
        other => {
            return Err(BhyveboxError::UnsupportedArgument(format!(
                "{} has no grub-bhyve mapping",
                other
            )));
        }
    };
    Ok(device)
}

pub(super) fn switch(flag: &str, enabled: bool) -> Device {
    if enabled {
        Device::flag(flag)
    } else {
        Device::empty()
    }
}

/// A flag whose operand must be present; a bare flag would swallow the
/// next token.
pub(super) fn required_arg(flag: &str, value: &str) -> BhyveboxResult<Device> {
    if value.trim().is_empty() {
        return Err(BhyveboxError::UnsupportedArgument(format!(
            "{} requires a value",
            flag
        )));
    }
    Ok(Device::with_arg(flag, value))
}

pub(super) fn optional_arg(flag: &str, value: &str) -> Device {
    if value.is_empty() {
        Device::empty()
    } else {
        Device::with_arg(flag, value)
    }
}
