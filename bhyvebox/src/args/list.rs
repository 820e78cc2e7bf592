//! Ordered device collections.

use super::Device;
use std::fmt;

/// Devices in command-line order. Never sorted or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    devices: Vec<Device>,
}

impl DeviceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, device: Device) {
        self.devices.push(device);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Flatten to the argument vector handed to the child process.
    ///
    /// No-op devices are dropped before flattening.
    pub fn to_tokens(&self) -> Vec<String> {
        self.devices
            .iter()
            .filter(|d| !d.is_noop())
            .flat_map(Device::to_tokens)
            .collect()
    }
}

impl FromIterator<Device> for DeviceList {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DeviceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .devices
            .iter()
            .filter(|d| !d.is_noop())
            .map(Device::to_string)
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
