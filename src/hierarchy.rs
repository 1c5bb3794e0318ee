// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Build and serve the immutable staticfs hierarchy index.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::SystemTime;

use thiserror::Error;

/// Inode assigned to the hierarchy root; FUSE addresses the root as node 1.
pub const ROOT_INODE: u64 = 1;

/// One file or directory record in the virtual hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    kind: EntryKind,
    timestamp: SystemTime,
    ino: u64,
}

/// Closed entry kind; files carry their payload inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file with an immutable byte payload.
    File {
        /// Full file contents.
        payload: Vec<u8>,
    },
    /// Directory; its children live in the tree view.
    Directory,
}

impl Entry {
    /// Construct a regular file entry.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        ino: u64,
        timestamp: SystemTime,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File { payload },
            timestamp,
            ino,
        }
    }

    /// Construct a directory entry.
    #[must_use]
    pub fn directory(name: impl Into<String>, ino: u64, timestamp: SystemTime) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            timestamp,
            ino,
        }
    }

    /// Base name segment; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entry kind.
    #[must_use]
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Uniform timestamp used for every time attribute.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Stable inode number, unique across the hierarchy.
    #[must_use]
    pub fn ino(&self) -> u64 {
        self.ino
    }

    /// True when the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// File payload bytes; directories carry none.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match &self.kind {
            EntryKind::File { payload } => payload,
            EntryKind::Directory => &[],
        }
    }
}

/// Join a parent path and a child name into a full path.
#[must_use]
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Faults detected while declaring the tree view or deriving the flat view.
/// Any of these prevents startup; none surfaces as a per-request error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The tree view declares the same full path twice.
    #[error("duplicate entry at {0}")]
    DuplicatePath(String),
    /// Two entries share an inode number.
    #[error("duplicate inode {ino} at {path}")]
    DuplicateInode {
        /// Offending inode number.
        ino: u64,
        /// Path of the later entry.
        path: String,
    },
    /// The same parent path was populated twice.
    #[error("children of {0} declared twice")]
    DuplicateParent(String),
    /// A tree key has no directory entry of its own.
    #[error("no directory entry declared for {0}")]
    MissingDirectory(String),
    /// A child entry carries a name that cannot form a path segment.
    #[error("invalid entry name {name:?} under {parent}")]
    InvalidName {
        /// Parent path of the offending entry.
        parent: String,
        /// Offending name.
        name: String,
    },
}

/// Immutable tree + flat views over the hierarchy. Built exactly once before
/// serving starts; reads need no synchronisation.
#[derive(Debug)]
pub struct HierarchyIndex {
    tree: BTreeMap<String, Vec<Arc<Entry>>>,
    flat: HashMap<String, Arc<Entry>>,
    paths: HashMap<u64, String>,
}

impl HierarchyIndex {
    /// Exact-match lookup by full path.
    #[must_use]
    pub fn resolve_flat(&self, path: &str) -> Option<&Arc<Entry>> {
        self.flat.get(path)
    }

    /// Declaration-ordered children of a directory path; `None` when the
    /// path is a file or absent.
    #[must_use]
    pub fn resolve_children(&self, path: &str) -> Option<&[Arc<Entry>]> {
        self.tree.get(path).map(Vec::as_slice)
    }

    /// Full path owning the supplied inode.
    #[must_use]
    pub fn path_of(&self, ino: u64) -> Option<&str> {
        self.paths.get(&ino).map(String::as_str)
    }

    /// Number of entries in the flat view, the root included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.flat.len()
    }
}

/// Builder collecting tree declarations before the one-time derivation pass.
#[derive(Debug)]
pub struct HierarchyBuilder {
    root: Arc<Entry>,
    tree: BTreeMap<String, Vec<Arc<Entry>>>,
}

impl HierarchyBuilder {
    /// Start a hierarchy rooted at `/` with the supplied timestamp. The root
    /// entry is the only one constructed implicitly.
    #[must_use]
    pub fn new(timestamp: SystemTime) -> Self {
        Self {
            root: Arc::new(Entry::directory("", ROOT_INODE, timestamp)),
            tree: BTreeMap::new(),
        }
    }

    /// Declare the ordered children of a directory path.
    pub fn populate(
        &mut self,
        parent: impl Into<String>,
        children: Vec<Entry>,
    ) -> Result<(), HierarchyError> {
        let parent = parent.into();
        if self.tree.contains_key(&parent) {
            return Err(HierarchyError::DuplicateParent(parent));
        }
        for child in &children {
            validate_name(&parent, child.name())?;
        }
        self.tree
            .insert(parent, children.into_iter().map(Arc::new).collect());
        Ok(())
    }

    /// Run the derivation pass and freeze the index. Fails fast on any
    /// duplicate full path, duplicate inode, or tree key whose own directory
    /// entry was never declared.
    pub fn build(self) -> Result<HierarchyIndex, HierarchyError> {
        let mut flat: HashMap<String, Arc<Entry>> = HashMap::new();
        let mut paths: HashMap<u64, String> = HashMap::new();
        flat.insert("/".to_owned(), Arc::clone(&self.root));
        paths.insert(self.root.ino(), "/".to_owned());
        for (parent, children) in &self.tree {
            for child in children {
                let full = join_path(parent, child.name());
                if flat.insert(full.clone(), Arc::clone(child)).is_some() {
                    return Err(HierarchyError::DuplicatePath(full));
                }
                if paths.insert(child.ino(), full.clone()).is_some() {
                    return Err(HierarchyError::DuplicateInode {
                        ino: child.ino(),
                        path: full,
                    });
                }
            }
        }
        for parent in self.tree.keys() {
            match flat.get(parent) {
                Some(entry) if entry.is_dir() => {}
                _ => return Err(HierarchyError::MissingDirectory(parent.clone())),
            }
        }
        Ok(HierarchyIndex {
            tree: self.tree,
            flat,
            paths,
        })
    }
}

fn validate_name(parent: &str, name: &str) -> Result<(), HierarchyError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.as_bytes().iter().any(|byte| *byte == 0);
    if invalid {
        return Err(HierarchyError::InvalidName {
            parent: parent.to_owned(),
            name: name.to_owned(),
        });
    }
    Ok(())
}
