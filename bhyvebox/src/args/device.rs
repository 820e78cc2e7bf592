//! Single units of bhyve/grub-bhyve command-line syntax.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `key` or `key=value` configuration fragment.
///
/// Renders as the bare key when the value is empty, which is how bhyve
/// expects backing paths (`-s 4,virtio-blk,/dev/zvol/...`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A key with no value, rendered without `=`.
    pub fn bare(key: impl Into<String>) -> Self {
        Self::new(key, "")
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}={}", self.key, self.value)
        }
    }
}

/// Structured `slot,emulation,conf` descriptor.
///
/// Members that are empty are skipped when rendering, so the LPC serial
/// descriptor (`com1,/dev/nmdm0A`) and the host bridge (`0,hostbridge`)
/// share one representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub slot: Option<u8>,
    pub emulation: String,
    pub conf: KeyValue,
}

impl DeviceSpec {
    pub fn new(slot: Option<u8>, emulation: impl Into<String>, conf: KeyValue) -> Self {
        Self {
            slot,
            emulation: emulation.into(),
            conf,
        }
    }

    /// Non-empty members in fixed slot, emulation, conf order.
    pub fn components(&self) -> Vec<String> {
        let slot = self.slot.map(|s| s.to_string()).unwrap_or_default();
        [slot, self.emulation.clone(), self.conf.to_string()]
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.components().is_empty()
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components().join(","))
    }
}

/// What follows a device's flag, if anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    #[default]
    None,
    /// A plain positional value (`-c 2`, or the guest name on its own).
    Arg(String),
    /// A PCI/LPC style descriptor.
    Spec(DeviceSpec),
}

impl Operand {
    fn render(&self) -> String {
        match self {
            Operand::None => String::new(),
            Operand::Arg(arg) => arg.clone(),
            Operand::Spec(spec) => spec.to_string(),
        }
    }
}

/// One hypervisor command-line unit: an optional flag plus its operand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    flag: Option<String>,
    operand: Operand,
}

impl Device {
    /// A device that contributes nothing; dropped when flattening.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A boolean switch such as `-A`.
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            flag: Some(flag.into()),
            operand: Operand::None,
        }
    }

    /// A flag followed by a plain value, e.g. `-m 512M`.
    pub fn with_arg(flag: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            flag: Some(flag.into()),
            operand: Operand::Arg(arg.into()),
        }
    }

    /// A bare positional token with no flag.
    pub fn positional(arg: impl Into<String>) -> Self {
        Self {
            flag: None,
            operand: Operand::Arg(arg.into()),
        }
    }

    /// A flag followed by a structured descriptor.
    pub fn with_spec(flag: impl Into<String>, spec: DeviceSpec) -> Self {
        Self {
            flag: Some(flag.into()),
            operand: Operand::Spec(spec),
        }
    }

    /// A `-s slot,emulation,conf` PCI device.
    pub fn pci(slot: u8, emulation: impl Into<String>, conf: KeyValue) -> Self {
        Self::with_spec("-s", DeviceSpec::new(Some(slot), emulation, conf))
    }

    pub fn flag_token(&self) -> Option<&str> {
        self.flag.as_deref().filter(|f| !f.is_empty())
    }

    /// The rendered operand; empty when there is nothing to emit.
    pub fn operand_string(&self) -> String {
        self.operand.render()
    }

    /// True when the device would emit no tokens at all.
    pub fn is_noop(&self) -> bool {
        self.flag_token().is_none() && self.operand_string().is_empty()
    }

    /// Tokens for process execution: flag and operand as separate entries.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(2);
        if let Some(flag) = self.flag_token() {
            tokens.push(flag.to_string());
        }
        let operand = self.operand_string();
        if !operand.is_empty() {
            tokens.push(operand);
        }
        tokens
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tokens().join(" "))
    }
}
