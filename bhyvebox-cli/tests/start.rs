use predicates::prelude::*;
use rstest::rstest;

mod common;

#[rstest]
#[case::start("start")]
#[case::render("render")]
fn test_rejects_path_like_uuid(#[case] command: &str) {
    let ctx = common::bhyvebox();
    ctx.new_cmd()
        .args([command, "../../etc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not contain '/'"));
}

#[rstest]
#[case::start(&["--pool", "tank", "start", "1234abcd-0000"])]
#[case::render(&["--pool", "tank", "render", "1234abcd-0000"])]
#[case::list(&["ls"])]
fn test_without_zfs_tools(#[case] args: &[&str]) {
    let ctx = common::bhyvebox();
    ctx.new_cmd()
        .args(args)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("storage error: Failed to run zpool"));
}

#[test]
fn test_start_logs_to_stderr() {
    let ctx = common::bhyvebox();
    ctx.new_cmd()
        .args(["--pool", "tank", "start", "1234abcd-0000"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("Booting guest")
                .and(predicate::str::contains("1234abcd-0000")),
        );
}

#[test]
fn test_create_debug_logs_resolved_config() {
    let ctx = common::bhyvebox();
    ctx.new_cmd()
        .args([
            "--debug", "--pool", "tank", "create", "--uuid", "1234abcd-0000", "--name", "web",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Resolved guest configuration")
                .and(predicate::str::contains("web")),
        );
}
