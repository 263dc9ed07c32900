use assert_cmd::Command;
use predicates::prelude::*;

/// No etcd listens on port 1, so every read is refused at once.
const DEAD_PEER: &str = "127.0.0.1:1";

fn envetcd() -> Command {
    let mut cmd = Command::cargo_bin("envetcd").unwrap();
    cmd.env_remove("ENVETCD_PEERS")
        .env_remove("ENVETCD_WRITE_ENV")
        .env_remove("ENVETCD_NO_SYNC")
        .env_remove("LOG_LEVEL");
    cmd
}

#[test]
fn test_help_exits_zero() {
    envetcd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--peers"))
        .stdout(predicate::str::contains("--write-env"));
}

#[test]
fn test_version_exits_zero() {
    envetcd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_unknown_flag_is_parse_error() {
    envetcd().args(["--bogus", "env"]).assert().code(11);
}

#[test]
fn test_missing_command_is_parse_error() {
    envetcd()
        .args(["--no-sync", "-C", DEAD_PEER])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("no command given"));
}

#[test]
fn test_malformed_peer_is_store_error() {
    envetcd()
        .args(["--no-sync", "-C", ":", "env"])
        .assert()
        .code(13);
}

#[test]
fn test_unreachable_cluster_is_store_error() {
    envetcd()
        .args(["-C", DEAD_PEER, "env"])
        .assert()
        .code(13)
        .stderr(predicate::str::contains("cluster unreachable"));
}

#[cfg(unix)]
#[test]
fn test_child_exit_status_propagates() {
    envetcd()
        .args(["--no-sync", "-C", DEAD_PEER, "--", "sh", "-c", "exit 37"])
        .assert()
        .code(37);
}

#[cfg(unix)]
#[test]
fn test_child_sees_enrichment() {
    envetcd()
        .args(["--no-sync", "-C", DEAD_PEER, "-s", "web-api", "--hostname", "h1"])
        .args(["sh", "-c", "printf '%s %s %s' \"$ENVETCD_SYSTEM\" \"$ENVETCD_SERVICE\" \"$ETCD_PEERS\""])
        .assert()
        .success()
        .stdout("web web-api http://127.0.0.1:1");
}

#[test]
fn test_write_env_without_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("envetcd.env");

    envetcd()
        .args(["--no-sync", "-C", DEAD_PEER, "--hostname", "h1", "-w"])
        .arg(&path)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("ETCD_PEERS=\"http://127.0.0.1:1\"\n"));
    assert!(contents.contains("ENVETCD_HOSTNAME=\"h1\"\n"));
}
