// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate staticfs mount policy loading.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::fs;
use std::time::Duration;

use staticfs::policy::{load_policy, MountPolicy};

#[test]
fn default_policy_matches_the_original_timeouts() {
    let policy = MountPolicy::default();
    assert_eq!(policy.fsname, "staticfs");
    assert_eq!(policy.attr_ttl(), Duration::from_secs(1));
    assert_eq!(policy.entry_ttl(), Duration::from_secs(1));
}

#[test]
fn policy_loads_from_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("policy.toml");
    fs::write(
        &path,
        "[mount]\nfsname = \"demo\"\nattr_ttl_ms = 250\nentry_ttl_ms = 500\n",
    )
    .expect("write policy");
    let policy = load_policy(&path).expect("load policy");
    assert_eq!(policy.fsname, "demo");
    assert_eq!(policy.attr_ttl(), Duration::from_millis(250));
    assert_eq!(policy.entry_ttl(), Duration::from_millis(500));
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("policy.toml");
    fs::write(
        &path,
        "[mount]\nfsname = \"demo\"\nattr_ttl_ms = 250\nentry_ttl_ms = 500\nwritable = true\n",
    )
    .expect("write policy");
    assert!(load_policy(&path).is_err());
}

#[test]
fn empty_fsname_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("policy.toml");
    fs::write(
        &path,
        "[mount]\nfsname = \"  \"\nattr_ttl_ms = 250\nentry_ttl_ms = 500\n",
    )
    .expect("write policy");
    assert!(load_policy(&path).is_err());
}

#[test]
fn missing_policy_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    assert!(load_policy(&dir.path().join("absent.toml")).is_err());
}
