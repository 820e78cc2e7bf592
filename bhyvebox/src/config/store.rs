//! `config.json` persistence.
//!
//! The persisted file is the only state handed from `create` to a later,
//! separate `start` invocation.

use super::vm::VmConfig;
use crate::errors::{BhyveboxError, BhyveboxResult};
use crate::storage::GuestLayout;
use std::io::Write;

/// Write `config` to the guest's `config.json`.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// reader never observes a half-written config.
pub fn save(layout: &GuestLayout, config: &VmConfig) -> BhyveboxResult<()> {
    let path = layout.config_path();
    let dir = layout.guest_path();

    let json = serde_json::to_vec_pretty(config)
        .map_err(|e| BhyveboxError::Internal(format!("failed to serialize config: {}", e)))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| {
        BhyveboxError::Storage(format!(
            "failed to create temp file in {}: {}",
            dir.display(),
            e
        ))
    })?;
    tmp.write_all(&json)
        .and_then(|_| tmp.write_all(b"\n"))
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| BhyveboxError::Storage(format!("failed to write config: {}", e)))?;
    tmp.persist(&path).map_err(|e| {
        BhyveboxError::Storage(format!("failed to persist {}: {}", path.display(), e.error))
    })?;

    tracing::debug!(uuid = %config.uuid, path = %path.display(), "Saved guest config");
    Ok(())
}

/// Read the guest's `config.json` back.
///
/// A file that `create` would have refused is rejected as well.
pub fn load(layout: &GuestLayout) -> BhyveboxResult<VmConfig> {
    let path = layout.config_path();
    let raw = std::fs::read(&path).map_err(|e| {
        BhyveboxError::ConfigLoad(format!("failed to read {}: {}", path.display(), e))
    })?;
    let config: VmConfig = serde_json::from_slice(&raw).map_err(|e| {
        BhyveboxError::ConfigLoad(format!("failed to parse {}: {}", path.display(), e))
    })?;

    if config.uuid != layout.uuid() {
        return Err(BhyveboxError::ConfigLoad(format!(
            "{} belongs to guest '{}', expected '{}'",
            path.display(),
            config.uuid,
            layout.uuid()
        )));
    }
    config.validate().map_err(|e| {
        BhyveboxError::ConfigLoad(format!("invalid config {}: {}", path.display(), e))
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn guest(dir: &TempDir, uuid: &str) -> GuestLayout {
        let layout = GuestLayout::new("tank", uuid, dir.path());
        std::fs::create_dir_all(layout.guest_path()).unwrap();
        layout
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let layout = guest(&dir, "abc");
        let config = VmConfig::new("abc").with_name("web").with_vcpus(4);

        save(&layout, &config).unwrap();
        assert_eq!(load(&layout).unwrap(), config);

        let leftovers: Vec<_> = std::fs::read_dir(layout.guest_path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec!["config.json"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let layout = guest(&dir, "abc");
        let err = load(&layout).unwrap_err();
        assert!(matches!(err, BhyveboxError::ConfigLoad(_)));
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let layout = guest(&dir, "abc");
        std::fs::write(layout.config_path(), "{ not json").unwrap();
        let err = load(&layout).unwrap_err();
        assert!(matches!(err, BhyveboxError::ConfigLoad(_)));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_load_rejects_foreign_uuid() {
        let dir = TempDir::new().unwrap();
        let layout = guest(&dir, "abc");
        std::fs::write(layout.config_path(), r#"{"uuid": "other"}"#).unwrap();
        assert!(matches!(load(&layout), Err(BhyveboxError::ConfigLoad(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let layout = guest(&dir, "abc");
        for raw in [
            r#"{"uuid": "abc", "ram": ""}"#,
            r#"{"uuid": "abc", "vcpus": 0}"#,
            r#"{"uuid": "abc", "disk_size": "0G"}"#,
        ] {
            std::fs::write(layout.config_path(), raw).unwrap();
            let err = load(&layout).unwrap_err();
            assert!(matches!(err, BhyveboxError::ConfigLoad(_)), "{raw}");
            assert!(err.to_string().contains("invalid config"));
        }
    }

    #[test]
    fn test_save_without_guest_dir_fails() {
        let dir = TempDir::new().unwrap();
        let layout = GuestLayout::new("tank", "missing", dir.path());
        assert!(matches!(
            save(&layout, &VmConfig::new("missing")),
            Err(BhyveboxError::Storage(_))
        ));
    }

    fn arb_config() -> impl Strategy<Value = VmConfig> {
        let text = "[a-zA-Z0-9/,._-]{0,16}";
        (
            (text, 1u32..64, "[1-9][0-9]{0,3}[KMG]", text, text, text, text),
            proptest::collection::vec(any::<bool>(), 10),
        )
            .prop_map(
                |((name, vcpus, ram, disk, nic, console1, console2), flags)| {
                    let mut cfg = VmConfig::new("1234abcd-0000-4000-8000-000000000000")
                        .with_name(name)
                        .with_vcpus(vcpus)
                        .with_ram(ram)
                        .with_disk_device(disk)
                        .with_serial_console(console1);
                    cfg.nic_device = nic;
                    cfg.serial_console2 = console2;
                    cfg.gen_acpi_tables = flags[0];
                    cfg.inc_guest_core_mem = flags[1];
                    cfg.exit_on_unemu_io_port = flags[2];
                    cfg.exit_on_pause = flags[3];
                    cfg.yield_cpu_on_hlt = flags[4];
                    cfg.ignore_unimplemented_msr_access = flags[5];
                    cfg.force_msi_interrupts = flags[6];
                    cfg.apic_x2_mode = flags[7];
                    cfg.disable_mp_table_generation = flags[8];
                    cfg.wire_guest_memory = flags[9];
                    cfg
                },
            )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn saved_config_loads_back_equal(config in arb_config()) {
            let dir = TempDir::new().unwrap();
            let layout = guest(&dir, &config.uuid);
            save(&layout, &config).unwrap();
            prop_assert_eq!(load(&layout).unwrap(), config);
        }
    }
}
