//! Constants for bhyvebox
//!
//! Centralized location for hardcoded paths, defaults and slot numbers.

pub mod envs {
    pub const BHYVEBOX_HOME: &str = "BHYVEBOX_HOME";
    pub const BHYVEBOX_POOL: &str = "BHYVEBOX_POOL";
}

/// Install locations of the two boot stage binaries.
pub mod binaries {
    pub const GRUB_BHYVE: &str = "/usr/local/sbin/grub-bhyve";
    pub const BHYVE: &str = "/usr/sbin/bhyve";
    pub const ZFS: &str = "zfs";
    pub const ZPOOL: &str = "zpool";
}

/// Fixed PCI slot assignments on the emulated bus.
pub mod pci_slots {
    pub const HOST_BRIDGE: u8 = 0;
    pub const DISK: u8 = 4;
    pub const NIC: u8 = 5;
    pub const LPC: u8 = 31;
}

/// Defaults applied to a new guest configuration.
pub mod vm_defaults {
    pub const VCPUS: u32 = 1;
    pub const RAM: &str = "256M";
    pub const BOOT_PARTITION: &str = "hd0,msdos1";
    pub const DISK_DRIVER: &str = "virtio-blk";
    pub const DISK_SIZE: &str = "256M";
    pub const NIC_DRIVER: &str = "virtio-net";
    pub const HOST_BRIDGE: &str = "hostbridge";
    pub const LPC: &str = "lpc";
    /// LPC serial port the first console is attached to.
    pub const SERIAL_PORT: &str = "com1";
}

/// Child datasets of every guest dataset.
pub mod datasets {
    pub const FIRMWARE: &str = "firmware";
    pub const ISO: &str = "iso";
    pub const DISK0: &str = "disk0";
    /// Root under which ZFS exposes volume device nodes.
    pub const ZVOL_DEV_ROOT: &str = "/dev/zvol";
    /// Firmware-visible name of the boot disk in the device map.
    pub const BOOT_DISK_ID: &str = "hd0";
}

/// File naming patterns
pub mod filenames {
    pub const CONFIG: &str = "config.json";
    pub const DEVICE_MAP: &str = "device.map";
    pub const LOCK_SUFFIX: &str = ".lock";
}
