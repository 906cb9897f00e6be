//! CLI argument parsing tests for the netdev command.
//!
//! These run without root: they either stop at argument parsing or use
//! paths that never open a netlink socket.

use assert_cmd::Command;
use predicates::prelude::*;

fn netdev_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_netdev"))
}

mod global_flags {
    use super::*;

    #[test]
    fn test_help() {
        netdev_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Network interface control tool"));
    }

    #[test]
    fn test_version() {
        netdev_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("netdev"));
    }

    #[test]
    fn test_invalid_subcommand() {
        netdev_cmd()
            .arg("invalid_command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod wait_command {
    use super::*;

    #[test]
    fn test_wait_help() {
        netdev_cmd()
            .args(["wait", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--until"))
            .stdout(predicate::str::contains("--any"));
    }

    #[test]
    fn test_wait_requires_names() {
        netdev_cmd()
            .arg("wait")
            .assert()
            .failure()
            .stderr(predicate::str::contains("required"));
    }

    #[test]
    fn test_wait_rejects_unknown_condition() {
        netdev_cmd()
            .args(["wait", "eth0", "--until", "sideways"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown condition"));
    }

    #[test]
    fn test_wait_for_absent_interface_gone() {
        // Already satisfied, so no socket is opened.
        netdev_cmd()
            .args(["wait", "nd-absent0", "--until", "down"])
            .assert()
            .success()
            .stdout("nd-absent0\n");
    }

    #[test]
    fn test_wait_json() {
        netdev_cmd()
            .args(["--json", "wait", "nd-absent0", "nd-absent1", "--until", "gone", "--any"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""interface":"nd-absent0""#))
            .stdout(predicate::str::contains(r#""quantifier":"any_of""#));
    }
}

mod status_command {
    use super::*;

    #[test]
    fn test_status_absent() {
        netdev_cmd()
            .args(["status", "nd-absent0"])
            .assert()
            .success()
            .stdout(predicate::str::contains("nd-absent0"))
            .stdout(predicate::str::contains("absent"));
    }

    #[test]
    fn test_status_json() {
        netdev_cmd()
            .args(["status", "--json", "nd-absent0"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""present":false"#))
            .stdout(predicate::str::contains(r#""has_ipv4":false"#));
    }

    #[test]
    fn test_status_alias() {
        netdev_cmd().args(["show", "--help"]).assert().success();
    }
}

mod link_commands {
    use super::*;

    #[test]
    fn test_vlan_id_range() {
        netdev_cmd()
            .args(["vlan", "eth0", "5000"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("5000"));
    }

    #[test]
    fn test_vlan_id_zero() {
        netdev_cmd().args(["vlan", "eth0", "0"]).assert().failure();
    }

    #[test]
    fn test_add_requires_name() {
        netdev_cmd()
            .arg("add")
            .assert()
            .failure()
            .stderr(predicate::str::contains("required"));
    }

    #[test]
    fn test_up_help() {
        netdev_cmd()
            .args(["up", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--ioctl"));
    }
}

mod monitor_command {
    use super::*;

    #[test]
    fn test_monitor_conflicting_filters() {
        netdev_cmd()
            .args(["monitor", "--links", "--addresses"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot be used with"));
    }
}
