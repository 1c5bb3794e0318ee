// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: CLI entry point for the staticfs FUSE driver.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! CLI entry point for the staticfs read-only FUSE driver.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use staticfs::policy::{default_policy_path, load_policy, MountPolicy};
use staticfs::{mount, seed};

#[derive(Debug, Parser)]
#[command(author = "Lukas Bower", version, about = "Read-only in-memory FUSE driver")]
struct Cli {
    /// Mount point on the host filesystem.
    #[arg(long, value_name = "DIR")]
    at: PathBuf,

    /// Path to the mount policy TOML.
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let policy = resolve_policy(cli.policy)?;
    let index = seed::demo_hierarchy().context("build hierarchy index")?;
    info!(
        "serving {} entries at {}",
        index.entry_count(),
        cli.at.display()
    );
    println!("Unmount to terminate.");
    mount::mount(Arc::new(index), &policy, &cli.at)?;
    info!("{} unmounted", cli.at.display());
    Ok(())
}

fn resolve_policy(cli_path: Option<PathBuf>) -> Result<MountPolicy> {
    if let Some(path) = cli_path {
        return load_policy(&path);
    }
    if let Ok(value) = env::var("STATICFS_POLICY") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return load_policy(Path::new(trimmed));
        }
    }
    let default = default_policy_path();
    if default.is_file() {
        return load_policy(&default);
    }
    Ok(MountPolicy::default())
}
