//! Compiles a [`VmConfig`] into the two boot stage commands.
//!
//! Each stage walks its own fixed, ordered list of [`ConfigKey`]s and maps
//! every key to exactly one [`Device`]. The list order is the command-line
//! order.

mod bootloader;
mod hypervisor;

use crate::args::{Device, DeviceList};
use crate::config::{ConfigKey, VmConfig};
use crate::constants::binaries;
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::storage::GuestLayout;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which of the two boot binaries a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// grub-bhyve: loads the guest kernel into memory.
    Bootloader,
    /// bhyve: runs the guest.
    Hypervisor,
}

impl Stage {
    pub fn binary(&self) -> &'static Path {
        match self {
            Stage::Bootloader => Path::new(binaries::GRUB_BHYVE),
            Stage::Hypervisor => Path::new(binaries::BHYVE),
        }
    }

    /// Keys this stage consumes, in command-line order.
    pub fn relevant_keys(&self) -> &'static [ConfigKey] {
        match self {
            Stage::Bootloader => bootloader::KEYS,
            Stage::Hypervisor => hypervisor::KEYS,
        }
    }

    /// Map one key to its device for this stage.
    ///
    /// Keys the stage has no mapping for are rejected, never skipped.
    pub fn device_for(
        &self,
        key: ConfigKey,
        config: &VmConfig,
        layout: &GuestLayout,
    ) -> BhyveboxResult<Device> {
        match self {
            Stage::Bootloader => bootloader::device_for(key, config, layout),
            Stage::Hypervisor => hypervisor::device_for(key, config, layout),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Bootloader => "bootloader",
            Stage::Hypervisor => "hypervisor",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ready-to-run binary plus its flattened arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    binary: PathBuf,
    args: Vec<String>,
}

impl Command {
    pub fn new(binary: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            binary: binary.into(),
            args,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// A `std::process::Command` with the same binary and arguments.
    pub fn to_process_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.binary);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.binary.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Resolve every relevant key of `stage` into an ordered device list.
pub fn devices(stage: Stage, config: &VmConfig, layout: &GuestLayout) -> BhyveboxResult<DeviceList> {
    devices_for_keys(stage, stage.relevant_keys(), config, layout)
}

fn devices_for_keys(
    stage: Stage,
    keys: &[ConfigKey],
    config: &VmConfig,
    layout: &GuestLayout,
) -> BhyveboxResult<DeviceList> {
    keys.iter()
        .map(|&key| {
            stage.device_for(key, config, layout).map_err(|e| {
                let reason = match e {
                    BhyveboxError::UnsupportedArgument(reason) => reason,
                    other => other.to_string(),
                };
                BhyveboxError::UnsupportedArgument(format!(
                    "building {} command, key '{}': {}",
                    stage, key, reason
                ))
            })
        })
        .collect()
}

/// Build the command for `stage`. Any key failure aborts the whole build.
pub fn build(stage: Stage, config: &VmConfig, layout: &GuestLayout) -> BhyveboxResult<Command> {
    let devices = devices(stage, config, layout)?;
    let command = Command::new(stage.binary(), devices.to_tokens());
    tracing::debug!(uuid = %config.uuid, %stage, command = %command, "Built stage command");
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "1234abcd-5678-4def-9abc-0123456789ab";

    fn reference_config() -> VmConfig {
        let mut cfg = VmConfig::new(UUID)
            .with_name("vm1")
            .with_vcpus(2)
            .with_ram("512M")
            .with_disk_device("/dev/zvol/pool/1234abcd/disk0");
        cfg.disk_driver = "virtio-blk".into();
        cfg.host_bridge = "hostbridge".into();
        cfg.lpc = "lpc".into();
        cfg.wire_guest_memory = true;
        cfg
    }

    fn layout() -> GuestLayout {
        GuestLayout::new("pool", UUID, "/")
    }

    fn strs(cmd: &Command) -> Vec<&str> {
        cmd.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_hypervisor_reference_order() {
        let cmd = build(Stage::Hypervisor, &reference_config(), &layout()).unwrap();
        assert_eq!(cmd.binary(), Path::new("/usr/sbin/bhyve"));
        assert_eq!(
            strs(&cmd),
            vec![
                "-A",
                "-H",
                "-P",
                "-S",
                "-c",
                "2",
                "-m",
                "512M",
                "-s",
                "4,virtio-blk,/dev/zvol/pool/1234abcd/disk0",
                "vm1",
                "-s",
                "0,hostbridge",
                "-s",
                "31,lpc",
                "1234abcd",
            ]
        );
    }

    #[test]
    fn test_hypervisor_with_console_and_nic() {
        let mut cfg = reference_config().with_serial_console("/dev/nmdm0A");
        cfg.nic_device = "tap0".into();
        cfg.nic_id = "1".into();

        let cmd = build(Stage::Hypervisor, &cfg, &layout()).unwrap();
        let args = strs(&cmd);
        let disk = args.iter().position(|a| a.starts_with("4,")).unwrap();
        assert_eq!(
            &args[disk + 1..disk + 6],
            &["-s", "5,virtio-net,id=1", "-l", "com1,/dev/nmdm0A", "vm1"]
        );
    }

    #[test]
    fn test_hypervisor_switches_follow_flags() {
        let mut cfg = reference_config();
        cfg.gen_acpi_tables = false;
        cfg.wire_guest_memory = false;
        let cmd = build(Stage::Hypervisor, &cfg, &layout()).unwrap();
        assert_eq!(&strs(&cmd)[..3], &["-H", "-P", "-c"]);
    }

    #[test]
    fn test_hypervisor_disk_defaults_to_zvol() {
        let cfg = VmConfig::new(UUID);
        let cmd = build(Stage::Hypervisor, &cfg, &layout()).unwrap();
        assert!(
            cmd.args()
                .contains(&format!("4,virtio-blk,/dev/zvol/pool/{UUID}/disk0"))
        );
    }

    #[test]
    fn test_bootloader_order() {
        let cfg = reference_config().with_serial_console("/dev/nmdm0A");
        let cmd = build(Stage::Bootloader, &cfg, &layout()).unwrap();
        assert_eq!(cmd.binary(), Path::new("/usr/local/sbin/grub-bhyve"));
        assert_eq!(
            strs(&cmd),
            vec![
                "-S",
                "-m",
                &format!("/pool/{UUID}/device.map"),
                "-r",
                "hd0,msdos1",
                "-c",
                "/dev/nmdm0A",
                "-M",
                "512M",
                "1234abcd",
            ]
        );
    }

    #[test]
    fn test_bootloader_drops_empty_console() {
        let cmd = build(Stage::Bootloader, &reference_config(), &layout()).unwrap();
        assert!(!cmd.args().iter().any(|a| a == "-c"));
        assert_eq!(cmd.args().last().map(String::as_str), Some("1234abcd"));
    }

    #[test]
    fn test_unmapped_key_is_rejected() {
        let cfg = reference_config();
        for (stage, key) in [
            (Stage::Bootloader, ConfigKey::Vcpus),
            (Stage::Hypervisor, ConfigKey::DiskSize),
        ] {
            let err = devices_for_keys(stage, &[ConfigKey::Uuid, key], &cfg, &layout())
                .unwrap_err();
            assert!(matches!(err, BhyveboxError::UnsupportedArgument(_)));
            assert!(err.to_string().contains(key.as_str()));
        }
    }

    #[test]
    fn test_empty_required_operand_is_rejected() {
        let cfg = reference_config().with_ram("");
        for (stage, flag) in [(Stage::Bootloader, "-M"), (Stage::Hypervisor, "-m")] {
            let err = build(stage, &cfg, &layout()).unwrap_err();
            assert!(matches!(err, BhyveboxError::UnsupportedArgument(_)));
            assert!(err.to_string().contains(flag), "{err}");
        }

        let err = build(Stage::Hypervisor, &reference_config().with_vcpus(0), &layout())
            .unwrap_err();
        assert!(err.to_string().contains("key 'vcpus'"), "{err}");
    }

    #[test]
    fn test_relevant_keys_all_map() {
        let cfg = reference_config();
        for stage in [Stage::Bootloader, Stage::Hypervisor] {
            for &key in stage.relevant_keys() {
                assert!(stage.device_for(key, &cfg, &layout()).is_ok(), "{stage} {key}");
            }
        }
    }

    #[test]
    fn test_command_display() {
        let cmd = Command::new("/usr/sbin/bhyve", vec!["-A".into(), "-c".into(), "2".into()]);
        assert_eq!(cmd.to_string(), "/usr/sbin/bhyve -A -c 2");
    }
}
