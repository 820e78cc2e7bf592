//! bhyve argument mapping.

use super::bootloader::{required_arg, switch};
use crate::args::{Device, DeviceSpec, KeyValue};
use crate::config::{ConfigKey, VmConfig};
use crate::constants::{pci_slots, vm_defaults};
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::storage::GuestLayout;

/// Command-line order of the hypervisor stage.
pub(super) const KEYS: &[ConfigKey] = &[
    ConfigKey::GenAcpiTables,
    ConfigKey::YieldCpuOnHlt,
    ConfigKey::ExitOnPause,
    ConfigKey::WireGuestMemory,
    ConfigKey::Vcpus,
    ConfigKey::Ram,
    ConfigKey::DiskDevice,
    ConfigKey::NicDevice,
    ConfigKey::SerialConsole1,
    ConfigKey::Name,
    ConfigKey::HostBridge,
    ConfigKey::Lpc,
    ConfigKey::Uuid,
];

pub(super) fn device_for(
    key: ConfigKey,
    config: &VmConfig,
    layout: &GuestLayout,
) -> BhyveboxResult<Device> {
    let device = match key {
        ConfigKey::GenAcpiTables => switch("-A", config.gen_acpi_tables),
        ConfigKey::YieldCpuOnHlt => switch("-H", config.yield_cpu_on_hlt),
        ConfigKey::ExitOnPause => switch("-P", config.exit_on_pause),
        ConfigKey::WireGuestMemory => switch("-S", config.wire_guest_memory),
        ConfigKey::IncGuestCoreMem => switch("-C", config.inc_guest_core_mem),
        ConfigKey::ExitOnUnemuIoPort => switch("-e", config.exit_on_unemu_io_port),
        ConfigKey::IgnoreUnimplementedMsrAccess => {
            switch("-w", config.ignore_unimplemented_msr_access)
        }
        ConfigKey::ForceMsiInterrupts => switch("-W", config.force_msi_interrupts),
        ConfigKey::ApicX2Mode => switch("-x", config.apic_x2_mode),
        ConfigKey::DisableMpTableGeneration => switch("-Y", config.disable_mp_table_generation),
        ConfigKey::Vcpus if config.vcpus == 0 => {
            return Err(BhyveboxError::UnsupportedArgument(
                "-c requires at least one vcpu".into(),
            ));
        }
        ConfigKey::Vcpus => Device::with_arg("-c", config.vcpus.to_string()),
        ConfigKey::Ram => required_arg("-m", &config.ram)?,
        ConfigKey::DiskDevice => {
            let backing = if config.disk_device.is_empty() {
                layout.zvol_device_path().display().to_string()
            } else {
                config.disk_device.clone()
            };
            slot_device(pci_slots::DISK, &config.disk_driver, KeyValue::bare(backing))
        }
        ConfigKey::NicDevice if config.nic_device.is_empty() => Device::empty(),
        ConfigKey::NicDevice => slot_device(
            pci_slots::NIC,
            &config.nic_driver,
            KeyValue::new("id", &config.nic_id),
        ),
        ConfigKey::SerialConsole1 if config.serial_console1.is_empty() => Device::empty(),
        ConfigKey::SerialConsole1 => Device::with_spec(
            "-l",
            DeviceSpec::new(
                None,
                vm_defaults::SERIAL_PORT,
                KeyValue::bare(&config.serial_console1),
            ),
        ),
        ConfigKey::Name if config.name.is_empty() => Device::empty(),
        ConfigKey::Name => Device::positional(&config.name),
        ConfigKey::HostBridge => slot_device(
            pci_slots::HOST_BRIDGE,
            &config.host_bridge,
            KeyValue::default(),
        ),
        ConfigKey::Lpc => slot_device(pci_slots::LPC, &config.lpc, KeyValue::default()),
        ConfigKey::Uuid => Device::positional(config.short_id()),
        other => {
            return Err(BhyveboxError::UnsupportedArgument(format!(
                "{} has no bhyve mapping",
                other
            )));
        }
    };
    Ok(device)
}

/// A PCI device, or nothing when no emulation is configured for the slot.
fn slot_device(slot: u8, emulation: &str, conf: KeyValue) -> Device {
    if emulation.is_empty() {
        Device::empty()
    } else {
        Device::pci(slot, emulation, conf)
    }
}
