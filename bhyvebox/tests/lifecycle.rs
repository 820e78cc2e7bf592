//! Create → list → render → start across separate runtime instances.

use bhyvebox::lock::GuestLock;
use bhyvebox::{BhyveboxError, Stage, VmConfig};
use bhyvebox_test_utils::TestContext;

#[test]
fn create_generates_uuid_and_default_disk() {
    let ctx = TestContext::new();
    let config = ctx.runtime().create(VmConfig::default().with_name("web")).unwrap();

    assert_eq!(config.uuid.len(), 36);
    assert_eq!(
        config.disk_device,
        format!("/dev/zvol/tank/{}/disk0", config.uuid)
    );
    let layout = ctx.runtime().layout(&config.uuid);
    assert!(layout.config_path().is_file());
    assert!(layout.device_map_path().is_file());
}

#[test]
fn create_rejects_invalid_config_before_touching_storage() {
    let ctx = TestContext::new();
    let err = ctx
        .runtime()
        .create(VmConfig::new("abc").with_ram("lots"))
        .unwrap_err();
    assert!(matches!(err, BhyveboxError::Config(_)));
    assert!(ctx.zfs.creates().is_empty());
}

#[test]
fn persisted_config_is_never_replaced() {
    let ctx = TestContext::new();
    let runtime = ctx.runtime();
    runtime.create(VmConfig::new("abc").with_vcpus(2)).unwrap();
    let err = runtime.create(VmConfig::new("abc").with_vcpus(4)).unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert_eq!(ctx.zfs.datasets().len(), 4);
    let listed = runtime.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].vcpus, 2);
}

#[test]
fn create_retry_after_partial_provisioning() {
    let ctx = TestContext::new();
    let runtime = ctx.runtime();
    ctx.zfs.fail_on("tank/abc/disk0");
    assert!(runtime.create(VmConfig::new("abc")).is_err());

    ctx.zfs.clear_failure();
    runtime.create(VmConfig::new("abc")).unwrap();
    assert_eq!(ctx.zfs.datasets().len(), 4);
}

#[test]
fn list_orders_by_name_and_skips_broken() {
    let ctx = TestContext::new();
    let runtime = ctx.runtime();
    runtime.create(VmConfig::new("b-1").with_name("zeta")).unwrap();
    runtime.create(VmConfig::new("a-1").with_name("alpha")).unwrap();
    let broken = runtime.create(VmConfig::new("c-1")).unwrap();
    std::fs::write(runtime.layout(&broken.uuid).config_path(), "[]").unwrap();
    std::fs::create_dir_all(ctx.mount_root.join("tank/not-a-guest")).unwrap();

    let names: Vec<String> = runtime.list().unwrap().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
}

#[test]
fn list_on_empty_pool() {
    let ctx = TestContext::with_pools(&["tank"]);
    let runtime = ctx.runtime_with_pool(Some("tank/guests")).unwrap();
    assert!(runtime.list().unwrap().is_empty());
}

#[test]
fn render_matches_what_start_runs() {
    let ctx = TestContext::new();
    let config = ctx
        .runtime()
        .create(VmConfig::new("1234abcd-0000").with_serial_console("/dev/nmdm0A"))
        .unwrap();

    let rendered = ctx.runtime().render(&config.uuid).unwrap();
    assert_eq!(rendered[0].0, Stage::Bootloader);
    assert_eq!(rendered[1].0, Stage::Hypervisor);

    ctx.runtime().start(&config.uuid).unwrap();
    let calls = ctx.runner.calls();
    assert_eq!(calls[0], rendered[0].1);
    assert_eq!(calls[1], rendered[1].1);
}

#[test]
fn render_unknown_guest() {
    let ctx = TestContext::new();
    let err = ctx.runtime().render("nope").unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn busy_guest_is_rejected() {
    let ctx = TestContext::new();
    let runtime = ctx.runtime();
    let config = runtime.create(VmConfig::new("abc")).unwrap();

    let _held = GuestLock::acquire(&runtime.options().locks_dir(), &config.uuid).unwrap();
    assert!(matches!(runtime.start("abc"), Err(BhyveboxError::Lock(_))));
    assert!(matches!(
        runtime.create(VmConfig::new("abc")),
        Err(BhyveboxError::Lock(_))
    ));
    assert!(ctx.runner.calls().is_empty());

    runtime.create(VmConfig::new("other")).unwrap();
}
