// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Provide shared types for the staticfs read-only FUSE driver.
// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Read-only FUSE driver serving a fixed in-memory namespace. The hierarchy
//! is built once at startup, frozen, and then served lock-free to any number
//! of concurrent kernel requests.

/// Attribute derivation from hierarchy entries.
pub mod attr;
/// Immutable hierarchy index and its builder.
pub mod hierarchy;
/// FUSE adapter glue and mount helpers.
pub mod mount;
/// Path-addressed protocol operations.
pub mod node;
/// Mount policy loader.
pub mod policy;
/// Built-in demo namespace.
pub mod seed;

use thiserror::Error;

/// Errors surfaced by staticfs protocol operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsError {
    /// The requested path has no entry in the hierarchy.
    #[error("no entry at {0}")]
    NotFound(String),
    /// The request does not apply to the target entry.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FsError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Map the error onto the errno reported to the kernel.
    #[must_use]
    pub fn errno(&self) -> libc::c_int {
        match self {
            Self::NotFound(_) => libc::ENOENT,
            Self::InvalidRequest(_) => libc::EINVAL,
        }
    }
}
