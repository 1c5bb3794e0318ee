// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Expose the path-addressed protocol operation set.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::sync::Arc;

use fuser::{FileAttr, FileType};
use log::debug;

use crate::attr;
use crate::hierarchy::{join_path, Entry, HierarchyIndex};
use crate::FsError;

/// Generation reported for every lookup; inodes are never recycled.
pub const GENERATION: u64 = 1;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DirEntry {
    /// Inode of the listed entry.
    pub ino: u64,
    /// Base name of the listed entry.
    pub name: String,
    /// Full mode bits including the type tag.
    pub mode: u32,
    /// Protocol-level file type.
    pub kind: FileType,
}

/// Identity record registered with the protocol adapter after a successful
/// lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableId {
    /// Full mode bits of the resolved entry.
    pub mode: u32,
    /// Generation counter, always [`GENERATION`].
    pub generation: u64,
    /// Stable inode number.
    pub ino: u64,
}

/// Result of resolving one path segment.
#[derive(Debug)]
pub struct Lookup {
    /// Attributes of the resolved child.
    pub attr: FileAttr,
    /// Identity record for the protocol adapter to register.
    pub id: StableId,
    /// Fresh node bound to the resolved child path.
    pub node: PathNode,
}

/// Transient adapter binding a resolved path to the operation set. Every
/// operation is a stateless query against the shared index.
#[derive(Debug, Clone)]
pub struct PathNode {
    index: Arc<HierarchyIndex>,
    path: String,
}

impl PathNode {
    /// Bind a node to an already resolved full path.
    #[must_use]
    pub fn new(index: Arc<HierarchyIndex>, path: impl Into<String>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }

    /// Node bound to the hierarchy root.
    #[must_use]
    pub fn root(index: Arc<HierarchyIndex>) -> Self {
        Self::new(index, "/")
    }

    /// Full path this node was resolved to.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    fn entry(&self) -> Result<&Arc<Entry>, FsError> {
        self.index
            .resolve_flat(&self.path)
            .ok_or_else(|| FsError::not_found(&self.path))
    }

    /// Attributes of the entry at this path.
    pub fn getattr(&self) -> Result<FileAttr, FsError> {
        debug!("getattr {}", self.path);
        Ok(attr::attributes(self.entry()?))
    }

    /// Validate that this path names a directory. Existence check only; no
    /// handle is allocated.
    pub fn opendir(&self) -> Result<(), FsError> {
        debug!("opendir {}", self.path);
        self.index
            .resolve_children(&self.path)
            .map(|_| ())
            .ok_or_else(|| FsError::not_found(&self.path))
    }

    /// Enumerate the directory in declaration order. Restartable: every call
    /// re-enumerates from scratch.
    pub fn readdir(&self) -> Result<Vec<DirEntry>, FsError> {
        debug!("readdir {}", self.path);
        let children = self
            .index
            .resolve_children(&self.path)
            .ok_or_else(|| FsError::not_found(&self.path))?;
        Ok(children
            .iter()
            .map(|child| DirEntry {
                ino: child.ino(),
                name: child.name().to_owned(),
                mode: attr::mode(child),
                kind: attr::file_type(child),
            })
            .collect())
    }

    /// Resolve one child name under this path.
    pub fn lookup(&self, name: &str) -> Result<Lookup, FsError> {
        let child_path = join_path(&self.path, name);
        debug!("lookup {child_path}");
        let entry = self
            .index
            .resolve_flat(&child_path)
            .ok_or_else(|| FsError::not_found(&child_path))?;
        let id = StableId {
            mode: attr::mode(entry),
            generation: GENERATION,
            ino: entry.ino(),
        };
        Ok(Lookup {
            attr: attr::attributes(entry),
            id,
            node: PathNode::new(Arc::clone(&self.index), child_path),
        })
    }

    /// Open the entry read-only and return an independent payload handle.
    /// Write access is never granted.
    pub fn open(&self, flags: i32) -> Result<ReadHandle, FsError> {
        debug!("open {} flags {flags:#o}", self.path);
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            return Err(FsError::invalid(format!(
                "write access denied for {}",
                self.path
            )));
        }
        let entry = self.entry()?;
        if entry.is_dir() {
            return Err(FsError::invalid(format!(
                "{} is not a regular file",
                self.path
            )));
        }
        Ok(ReadHandle {
            entry: Arc::clone(entry),
        })
    }

    /// Read up to `size` bytes starting at `offset`. Reads past the end of
    /// the payload yield an empty slice, not an error.
    pub fn read(&self, size: usize, offset: u64) -> Result<&[u8], FsError> {
        debug!("read {} offset {offset} size {size}", self.path);
        let entry = self.entry()?;
        Ok(slice_payload(entry.payload(), size, offset))
    }

    /// Nothing to persist on a read-only filesystem.
    pub fn flush(&self) -> Result<(), FsError> {
        debug!("flush {}", self.path);
        self.entry()?;
        Ok(())
    }
}

/// Read-only view over an open file's payload. Handles are independent per
/// open call; concurrent reads never interfere.
#[derive(Debug, Clone)]
pub struct ReadHandle {
    entry: Arc<Entry>,
}

impl ReadHandle {
    /// Read up to `size` bytes starting at `offset`.
    #[must_use]
    pub fn read_at(&self, size: usize, offset: u64) -> &[u8] {
        slice_payload(self.entry.payload(), size, offset)
    }

    /// Inode of the open entry.
    #[must_use]
    pub fn ino(&self) -> u64 {
        self.entry.ino()
    }
}

fn slice_payload(payload: &[u8], size: usize, offset: u64) -> &[u8] {
    let start = usize::try_from(offset)
        .unwrap_or(usize::MAX)
        .min(payload.len());
    let end = start.saturating_add(size).min(payload.len());
    &payload[start..end]
}
