//! Typed hypervisor command-line arguments.
//!
//! A [`Device`] is one flag with its operand; a [`DeviceList`] keeps them in
//! command-line order. Both render two ways that always agree:
//!
//! ```text
//! Device::pci(4, "virtio-blk", KeyValue::bare("/dev/zvol/tank/g/disk0"))
//!     display: "-s 4,virtio-blk,/dev/zvol/tank/g/disk0"
//!     tokens:  ["-s", "4,virtio-blk,/dev/zvol/tank/g/disk0"]
//! ```

mod device;
mod list;

pub use device::{Device, DeviceSpec, KeyValue, Operand};
pub use list::DeviceList;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn member() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[a-z0-9/_.-]{1,12}"]
    }

    proptest! {
        #[test]
        fn display_and_tokens_agree(
            flag in prop_oneof![Just(None), Just(Some("-s".to_string())), Just(Some("-l".to_string()))],
            slot in proptest::option::of(0u8..32),
            emulation in member(),
            key in member(),
            value in member(),
        ) {
            let spec = DeviceSpec::new(slot, emulation, KeyValue::new(key, value));
            let components = spec.components();
            let device = match flag {
                Some(f) => Device::with_spec(f, spec),
                None if components.is_empty() => Device::empty(),
                None => Device::positional(components.join(",")),
            };

            let tokens = device.to_tokens();
            prop_assert_eq!(device.to_string(), tokens.join(" "));

            let operand = tokens.last().cloned().unwrap_or_default();
            if !components.is_empty() {
                prop_assert_eq!(operand, components.join(","));
            }
        }
    }
}
