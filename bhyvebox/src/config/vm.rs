//! Guest configuration.

use crate::constants::vm_defaults;
use crate::errors::{BhyveboxError, BhyveboxResult};
use serde::{Deserialize, Serialize};

/// Identity and resources of one guest.
///
/// Built once when the guest is created, persisted next to its dataset as
/// `config.json`, and read back unchanged by every later `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VmConfig {
    /// Display name, passed to bhyve as the VM name token.
    pub name: String,
    /// Primary identifier; every derived path is a function of this.
    pub uuid: String,
    pub vcpus: u32,
    /// grub-bhyve root partition, e.g. `hd0,msdos1`.
    pub boot_partition: String,
    /// Guest memory in bhyve notation (`256M`, `2G`).
    pub ram: String,
    pub disk_driver: String,
    /// Backing device node of the boot disk.
    pub disk_device: String,
    /// Size of the `disk0` volume in ZFS notation.
    pub disk_size: String,
    pub nic_driver: String,
    /// Backing NIC; the NIC is only attached when this is set.
    pub nic_device: String,
    pub nic_id: String,
    pub serial_console1: String,
    pub serial_console2: String,
    pub host_bridge: String,
    pub lpc: String,

    // bhyve behavior switches
    pub gen_acpi_tables: bool,
    pub inc_guest_core_mem: bool,
    pub exit_on_unemu_io_port: bool,
    pub exit_on_pause: bool,
    pub yield_cpu_on_hlt: bool,
    pub ignore_unimplemented_msr_access: bool,
    pub force_msi_interrupts: bool,
    pub apic_x2_mode: bool,
    pub disable_mp_table_generation: bool,
    pub wire_guest_memory: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            uuid: String::new(),
            vcpus: vm_defaults::VCPUS,
            boot_partition: vm_defaults::BOOT_PARTITION.to_string(),
            ram: vm_defaults::RAM.to_string(),
            disk_driver: vm_defaults::DISK_DRIVER.to_string(),
            disk_device: String::new(),
            disk_size: vm_defaults::DISK_SIZE.to_string(),
            nic_driver: vm_defaults::NIC_DRIVER.to_string(),
            nic_device: String::new(),
            nic_id: String::new(),
            serial_console1: String::new(),
            serial_console2: String::new(),
            host_bridge: vm_defaults::HOST_BRIDGE.to_string(),
            lpc: vm_defaults::LPC.to_string(),
            gen_acpi_tables: true,
            inc_guest_core_mem: false,
            exit_on_unemu_io_port: false,
            exit_on_pause: true,
            yield_cpu_on_hlt: true,
            ignore_unimplemented_msr_access: false,
            force_msi_interrupts: false,
            apic_x2_mode: false,
            disable_mp_table_generation: false,
            wire_guest_memory: true,
        }
    }
}

impl VmConfig {
    /// Default configuration for the given UUID.
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    /// Assign a random v4 UUID if none is set yet.
    pub fn ensure_uuid(&mut self) -> &str {
        if self.uuid.is_empty() {
            self.uuid = uuid::Uuid::new_v4().to_string();
        }
        &self.uuid
    }

    /// First hyphen-delimited segment of the UUID.
    ///
    /// grub-bhyve and bhyve reject VM names containing hyphens, so this is
    /// what both stages receive as the guest name. Two UUIDs sharing a first
    /// segment collide here.
    pub fn short_id(&self) -> &str {
        self.uuid.split('-').next().unwrap_or_default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_vcpus(mut self, vcpus: u32) -> Self {
        self.vcpus = vcpus;
        self
    }

    pub fn with_ram(mut self, ram: impl Into<String>) -> Self {
        self.ram = ram.into();
        self
    }

    pub fn with_disk_device(mut self, device: impl Into<String>) -> Self {
        self.disk_device = device.into();
        self
    }

    pub fn with_serial_console(mut self, console: impl Into<String>) -> Self {
        self.serial_console1 = console.into();
        self
    }

    /// Reject values that would produce an unusable layout or command line.
    pub fn validate(&self) -> BhyveboxResult<()> {
        validate_uuid(&self.uuid)?;
        if self.vcpus == 0 {
            return Err(BhyveboxError::Config("vcpus must be at least 1".into()));
        }
        if !matches!(parse_size(&self.ram), Some(n) if n > 0) {
            return Err(BhyveboxError::Config(format!(
                "invalid ram size '{}' (expected e.g. 256M, 2G)",
                self.ram
            )));
        }
        if !matches!(parse_size(&self.disk_size), Some(n) if n > 0) {
            return Err(BhyveboxError::Config(format!(
                "invalid disk size '{}' (expected e.g. 256M, 10G)",
                self.disk_size
            )));
        }
        Ok(())
    }

    /// Emit the whole configuration as one structured log event.
    pub fn log_summary(&self, message: &str) {
        tracing::info!(
            name = %self.name,
            uuid = %self.uuid,
            vcpus = self.vcpus,
            boot_partition = %self.boot_partition,
            ram = %self.ram,
            disk_driver = %self.disk_driver,
            disk_device = %self.disk_device,
            disk_size = %self.disk_size,
            nic_driver = %self.nic_driver,
            nic_device = %self.nic_device,
            nic_id = %self.nic_id,
            serial_console1 = %self.serial_console1,
            serial_console2 = %self.serial_console2,
            host_bridge = %self.host_bridge,
            lpc = %self.lpc,
            gen_acpi_tables = self.gen_acpi_tables,
            inc_guest_core_mem = self.inc_guest_core_mem,
            exit_on_unemu_io_port = self.exit_on_unemu_io_port,
            exit_on_pause = self.exit_on_pause,
            yield_cpu_on_hlt = self.yield_cpu_on_hlt,
            ignore_unimplemented_msr_access = self.ignore_unimplemented_msr_access,
            force_msi_interrupts = self.force_msi_interrupts,
            apic_x2_mode = self.apic_x2_mode,
            disable_mp_table_generation = self.disable_mp_table_generation,
            wire_guest_memory = self.wire_guest_memory,
            "{}",
            message
        );
    }
}

/// Check that `uuid` can name a dataset and yields a non-empty short id.
pub fn validate_uuid(uuid: &str) -> BhyveboxResult<()> {
    if uuid.is_empty() {
        return Err(BhyveboxError::Config("uuid must not be empty".into()));
    }
    if uuid == "." || uuid == ".." || uuid.contains('/') || uuid.chars().any(char::is_whitespace) {
        return Err(BhyveboxError::Config(format!(
            "uuid '{}' must not contain '/' or whitespace, nor be a dot path",
            uuid
        )));
    }
    if uuid.split('-').next().unwrap_or_default().is_empty() {
        return Err(BhyveboxError::Config(format!(
            "uuid '{}' has an empty first segment",
            uuid
        )));
    }
    Ok(())
}

/// Parse a bhyve/ZFS size string (`512`, `256M`, `10G`) into bytes.
///
/// Bare numbers are bytes. Suffixes are binary multiples, case-insensitive.
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let (digits, multiplier) = match s.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => {
            let shift = match c.to_ascii_uppercase() {
                'K' => 10,
                'M' => 20,
                'G' => 30,
                'T' => 40,
                _ => return None,
            };
            (&s[..i], 1u64 << shift)
        }
        _ => (s, 1),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()?.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "1234abcd-5678-4def-9abc-0123456789ab";

    #[test]
    fn test_defaults() {
        let cfg = VmConfig::default();
        assert_eq!(cfg.vcpus, 1);
        assert_eq!(cfg.ram, "256M");
        assert_eq!(cfg.disk_driver, "virtio-blk");
        assert_eq!(cfg.boot_partition, "hd0,msdos1");
        assert!(cfg.gen_acpi_tables && cfg.yield_cpu_on_hlt && cfg.exit_on_pause);
        assert!(cfg.wire_guest_memory);
        assert!(!cfg.apic_x2_mode && !cfg.force_msi_interrupts);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(VmConfig::new(UUID).short_id(), "1234abcd");
        assert_eq!(VmConfig::new("nohyphens").short_id(), "nohyphens");
        assert_eq!(VmConfig::new("-leading").short_id(), "");
    }

    #[test]
    fn test_ensure_uuid_generates_once() {
        let mut cfg = VmConfig::default();
        let first = cfg.ensure_uuid().to_string();
        assert_eq!(first.len(), 36);
        assert_eq!(cfg.ensure_uuid(), first);

        let mut fixed = VmConfig::new(UUID);
        assert_eq!(fixed.ensure_uuid(), UUID);
    }

    #[test]
    fn test_validate() {
        assert!(VmConfig::new(UUID).validate().is_ok());
        assert!(VmConfig::default().validate().is_err());
        assert!(VmConfig::new("a/b").validate().is_err());
        assert!(VmConfig::new("..").validate().is_err());
        assert!(VmConfig::new("-x").validate().is_err());
        assert!(VmConfig::new(UUID).with_vcpus(0).validate().is_err());
        assert!(VmConfig::new(UUID).with_ram("lots").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(VmConfig::new(UUID).with_ram("0M").validate().is_err());
        assert!(VmConfig::new(UUID).with_ram("0").validate().is_err());

        let mut cfg = VmConfig::new(UUID);
        cfg.disk_size = "0G".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid disk size"));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512"), Some(512));
        assert_eq!(parse_size("256M"), Some(256 << 20));
        assert_eq!(parse_size("2g"), Some(2 << 30));
        assert_eq!(parse_size("1T"), Some(1 << 40));
        assert_eq!(parse_size(""), None);
        assert_eq!(parse_size("M"), None);
        assert_eq!(parse_size("12X"), None);
        assert_eq!(parse_size("1.5G"), None);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let cfg: VmConfig =
            serde_json::from_str(r#"{"uuid": "abc", "vcpus": 4, "name": "web"}"#).unwrap();
        assert_eq!(cfg.vcpus, 4);
        assert_eq!(cfg.ram, "256M");
        assert!(cfg.wire_guest_memory);
    }

    #[test]
    fn test_unknown_json_field_rejected() {
        let res: Result<VmConfig, _> = serde_json::from_str(r#"{"uuid": "abc", "cpus": 4}"#);
        assert!(res.is_err());
    }
}
