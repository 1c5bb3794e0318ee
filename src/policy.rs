// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Load and validate the staticfs mount policy.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// Mount policy applied uniformly by the protocol adapter. The two TTL knobs
/// bound how long the kernel may cache attributes and directory entries
/// before re-querying the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPolicy {
    /// Filesystem name reported to the kernel.
    pub fsname: String,
    /// Attribute cache lifetime in milliseconds.
    pub attr_ttl_ms: u64,
    /// Directory-entry cache lifetime in milliseconds.
    pub entry_ttl_ms: u64,
}

impl Default for MountPolicy {
    fn default() -> Self {
        Self {
            fsname: "staticfs".to_owned(),
            attr_ttl_ms: 1000,
            entry_ttl_ms: 1000,
        }
    }
}

impl MountPolicy {
    /// Attribute cache lifetime.
    #[must_use]
    pub fn attr_ttl(&self) -> Duration {
        Duration::from_millis(self.attr_ttl_ms)
    }

    /// Directory-entry cache lifetime.
    #[must_use]
    pub fn entry_ttl(&self) -> Duration {
        Duration::from_millis(self.entry_ttl_ms)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyToml {
    mount: MountTomlSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MountTomlSection {
    fsname: String,
    attr_ttl_ms: u64,
    entry_ttl_ms: u64,
}

/// Return the default policy path under the working directory or crate root.
#[must_use]
pub fn default_policy_path() -> PathBuf {
    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join("staticfs.toml");
        if candidate.is_file() {
            return candidate;
        }
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("staticfs.toml")
}

/// Load and validate the mount policy from disk.
pub fn load_policy(path: &Path) -> Result<MountPolicy> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read mount policy {}", path.display()))?;
    let parsed: PolicyToml = toml::from_str(&text)
        .with_context(|| format!("invalid mount policy TOML in {}", path.display()))?;
    let policy = MountPolicy {
        fsname: parsed.mount.fsname,
        attr_ttl_ms: parsed.mount.attr_ttl_ms,
        entry_ttl_ms: parsed.mount.entry_ttl_ms,
    };
    validate_policy(&policy)?;
    Ok(policy)
}

fn validate_policy(policy: &MountPolicy) -> Result<()> {
    if policy.fsname.trim().is_empty() {
        return Err(anyhow!("mount.fsname must not be empty"));
    }
    Ok(())
}
