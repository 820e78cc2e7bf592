//! Names of every guest configuration key.
//!
//! The command builder walks fixed, ordered lists of these keys; the string
//! forms match the keys accepted in configuration files and flags.

use crate::errors::BhyveboxError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Name,
    Uuid,
    Vcpus,
    BootPartition,
    Ram,
    DiskDriver,
    DiskDevice,
    DiskSize,
    NicDriver,
    NicDevice,
    NicId,
    SerialConsole1,
    SerialConsole2,
    HostBridge,
    Lpc,
    GenAcpiTables,
    IncGuestCoreMem,
    ExitOnUnemuIoPort,
    ExitOnPause,
    YieldCpuOnHlt,
    IgnoreUnimplementedMsrAccess,
    ForceMsiInterrupts,
    ApicX2Mode,
    DisableMpTableGeneration,
    WireGuestMemory,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 25] = [
        ConfigKey::Name,
        ConfigKey::Uuid,
        ConfigKey::Vcpus,
        ConfigKey::BootPartition,
        ConfigKey::Ram,
        ConfigKey::DiskDriver,
        ConfigKey::DiskDevice,
        ConfigKey::DiskSize,
        ConfigKey::NicDriver,
        ConfigKey::NicDevice,
        ConfigKey::NicId,
        ConfigKey::SerialConsole1,
        ConfigKey::SerialConsole2,
        ConfigKey::HostBridge,
        ConfigKey::Lpc,
        ConfigKey::GenAcpiTables,
        ConfigKey::IncGuestCoreMem,
        ConfigKey::ExitOnUnemuIoPort,
        ConfigKey::ExitOnPause,
        ConfigKey::YieldCpuOnHlt,
        ConfigKey::IgnoreUnimplementedMsrAccess,
        ConfigKey::ForceMsiInterrupts,
        ConfigKey::ApicX2Mode,
        ConfigKey::DisableMpTableGeneration,
        ConfigKey::WireGuestMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Name => "vmname",
            ConfigKey::Uuid => "uuid",
            ConfigKey::Vcpus => "vcpus",
            ConfigKey::BootPartition => "bootpartition",
            ConfigKey::Ram => "ram",
            ConfigKey::DiskDriver => "diskdriver",
            ConfigKey::DiskDevice => "diskdevice",
            ConfigKey::DiskSize => "disksize",
            ConfigKey::NicDriver => "nicdriver",
            ConfigKey::NicDevice => "nicdevice",
            ConfigKey::NicId => "nicid",
            ConfigKey::SerialConsole1 => "serialconsole1",
            ConfigKey::SerialConsole2 => "serialconsole2",
            ConfigKey::HostBridge => "hostbridge",
            ConfigKey::Lpc => "lpc",
            ConfigKey::GenAcpiTables => "genacpitables",
            ConfigKey::IncGuestCoreMem => "incguestcoremem",
            ConfigKey::ExitOnUnemuIoPort => "exitonunemuioport",
            ConfigKey::ExitOnPause => "exitonpause",
            ConfigKey::YieldCpuOnHlt => "yieldcpuonhlt",
            ConfigKey::IgnoreUnimplementedMsrAccess => "ignoreunimplementedmsraccess",
            ConfigKey::ForceMsiInterrupts => "forcemsiinterrupts",
            ConfigKey::ApicX2Mode => "apicx2mode",
            ConfigKey::DisableMpTableGeneration => "disablemptablegeneration",
            ConfigKey::WireGuestMemory => "wireguestmemory",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = BhyveboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| BhyveboxError::UnsupportedArgument(format!("no such key: {}", s)))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
