//! Tests for the `vrf` binary that do not need a network namespace.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use vrf_plugin::{ErrorResponse, VersionInfo};

const CNI_VARS: &[&str] = &[
    "CNI_COMMAND",
    "CNI_CONTAINERID",
    "CNI_NETNS",
    "CNI_IFNAME",
    "CNI_ARGS",
    "CNI_PATH",
];

fn plugin(command: &str) -> Command {
    let mut cmd = Command::cargo_bin("vrf").unwrap();
    for var in CNI_VARS {
        cmd.env_remove(var);
    }
    cmd.env("CNI_COMMAND", command)
        .env("CNI_CONTAINERID", "test-container");
    cmd
}

fn config(version: &str) -> String {
    json!({
        "cniVersion": version,
        "name": "test",
        "type": "vrf",
        "vrfname": "vrf0",
        "prevResult": { "cniVersion": version, "interfaces": [{ "name": "eth0" }] },
    })
    .to_string()
}

fn error_reply(cmd: &mut Command) -> ErrorResponse {
    let assert = cmd.assert().failure().code(1);
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

#[test]
fn version_lists_supported_versions() {
    let assert = plugin("VERSION").assert().success();
    let info: VersionInfo = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(info, VersionInfo::current());
}

#[test]
fn missing_command_is_an_environment_error() {
    let mut cmd = Command::cargo_bin("vrf").unwrap();
    for var in CNI_VARS {
        cmd.env_remove(var);
    }
    let reply = error_reply(&mut cmd);
    assert_eq!(reply.code, 4);
}

#[test]
fn missing_netns_is_an_environment_error() {
    let reply = error_reply(
        plugin("ADD")
            .env("CNI_IFNAME", "eth0")
            .write_stdin(config("1.0.0")),
    );
    assert_eq!(reply.code, 4);
    assert!(reply.msg.contains("CNI_NETNS"));
}

#[test]
fn malformed_config_is_a_decoding_error() {
    let reply = error_reply(
        plugin("ADD")
            .env("CNI_NETNS", "/var/run/netns/test")
            .env("CNI_IFNAME", "eth0")
            .write_stdin("{not json"),
    );
    assert_eq!(reply.code, 6);
}

#[test]
fn missing_vrf_name_is_a_config_error() {
    let reply = error_reply(
        plugin("ADD")
            .env("CNI_NETNS", "/var/run/netns/test")
            .env("CNI_IFNAME", "eth0")
            .write_stdin(json!({ "cniVersion": "1.0.0", "type": "vrf" }).to_string()),
    );
    assert_eq!(reply.code, 7);
    assert_eq!(reply.msg, "configuration is expected to have a valid vrf name");
    assert_eq!(reply.cni_version, "1.0.0");
}

#[test]
fn missing_prev_result_is_a_config_error() {
    let reply = error_reply(
        plugin("CHECK")
            .env("CNI_NETNS", "/var/run/netns/test")
            .env("CNI_IFNAME", "eth0")
            .write_stdin(json!({ "cniVersion": "1.0.0", "vrfname": "vrf0" }).to_string()),
    );
    assert_eq!(reply.code, 7);
    assert_eq!(reply.msg, "missing prevResult from earlier plugin");
}

#[test]
fn unsupported_version_is_rejected() {
    let reply = error_reply(
        plugin("ADD")
            .env("CNI_NETNS", "/var/run/netns/test")
            .env("CNI_IFNAME", "eth0")
            .write_stdin(config("0.3.1")),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(reply.cni_version, "0.3.1");
}

#[test]
fn del_after_namespace_removal_succeeds() {
    plugin("DEL")
        .env("CNI_NETNS", "/nonexistent/netns/12345")
        .env("CNI_IFNAME", "eth0")
        .write_stdin(config("1.0.0"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn add_into_missing_namespace_fails() {
    let reply = error_reply(
        plugin("ADD")
            .env("CNI_NETNS", "/nonexistent/netns/12345")
            .env("CNI_IFNAME", "eth0")
            .write_stdin(config("0.4.0")),
    );
    assert_eq!(reply.code, 100);
    assert!(reply.msg.starts_with("ADD failed"));
    assert_eq!(reply.cni_version, "0.4.0");
}
