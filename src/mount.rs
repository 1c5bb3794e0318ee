// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Translate FUSE kernel requests onto staticfs node operations.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use fuser::{
    FileType, Filesystem, MountOption, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty,
    ReplyEntry, ReplyOpen, Request,
};

use crate::hierarchy::{HierarchyIndex, ROOT_INODE};
use crate::node::{PathNode, ReadHandle};
use crate::policy::MountPolicy;

/// FUSE adapter dispatching kernel requests onto [`PathNode`] operations.
/// The index is read-only; the only mutable state is the open-handle table.
pub struct StaticFuse {
    index: Arc<HierarchyIndex>,
    attr_ttl: Duration,
    entry_ttl: Duration,
    handles: Mutex<HashMap<u64, ReadHandle>>,
    next_handle: AtomicU64,
}

impl StaticFuse {
    /// Wrap an index with the cache lifetimes from the mount policy.
    #[must_use]
    pub fn new(index: Arc<HierarchyIndex>, policy: &MountPolicy) -> Self {
        Self {
            index,
            attr_ttl: policy.attr_ttl(),
            entry_ttl: policy.entry_ttl(),
            handles: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        }
    }

    fn node_for(&self, ino: u64) -> Option<PathNode> {
        let path = self.index.path_of(ino)?;
        Some(PathNode::new(Arc::clone(&self.index), path))
    }

    fn parent_ino(&self, path: &str) -> u64 {
        let parent = match path.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &path[..idx],
        };
        self.index
            .resolve_flat(parent)
            .map_or(ROOT_INODE, |entry| entry.ino())
    }
}

impl Filesystem for StaticFuse {
    fn lookup(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &std::ffi::OsStr,
        reply: ReplyEntry,
    ) {
        let Some(node) = self.node_for(parent) else {
            reply.error(libc::ENOENT);
            return;
        };
        let name = name.to_string_lossy();
        match node.lookup(&name) {
            Ok(found) => reply.entry(&self.entry_ttl, &found.attr, found.id.generation),
            Err(err) => reply.error(err.errno()),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        let Some(node) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match node.getattr() {
            Ok(attributes) => reply.attr(&self.attr_ttl, &attributes),
            Err(err) => reply.error(err.errno()),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        let Some(node) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match node.opendir() {
            Ok(()) => reply.opened(0, 0),
            Err(err) => reply.error(err.errno()),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        let Some(node) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        let records = match node.readdir() {
            Ok(records) => records,
            Err(err) => {
                reply.error(err.errno());
                return;
            }
        };
        let mut listing = Vec::with_capacity(records.len().saturating_add(2));
        listing.push((ino, FileType::Directory, ".".to_owned()));
        listing.push((
            self.parent_ino(node.path()),
            FileType::Directory,
            "..".to_owned(),
        ));
        for record in records {
            listing.push((record.ino, record.kind, record.name));
        }
        let start = offset.max(0) as usize;
        for (idx, (ino, kind, name)) in listing.into_iter().enumerate().skip(start) {
            if reply.add(ino, (idx + 1) as i64, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        let Some(node) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match node.open(flags) {
            Ok(handle) => {
                let fh = self.next_handle.fetch_add(1, Ordering::Relaxed);
                self.handles
                    .lock()
                    .expect("handle lock")
                    .insert(fh, handle);
                reply.opened(fh, 0);
            }
            Err(err) => reply.error(err.errno()),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let handle = {
            let handles = self.handles.lock().expect("handle lock");
            handles.get(&fh).cloned()
        };
        let Some(handle) = handle else {
            reply.error(libc::EBADF);
            return;
        };
        if offset < 0 {
            reply.error(libc::EINVAL);
            return;
        }
        reply.data(handle.read_at(size as usize, offset as u64));
    }

    fn flush(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        let Some(node) = self.node_for(ino) else {
            reply.error(libc::ENOENT);
            return;
        };
        match node.flush() {
            Ok(()) => reply.ok(),
            Err(err) => reply.error(err.errno()),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        let handle = {
            let mut handles = self.handles.lock().expect("handle lock");
            handles.remove(&fh)
        };
        if handle.is_none() {
            reply.error(libc::EBADF);
            return;
        }
        reply.ok();
    }

    fn releasedir(&mut self, _req: &Request<'_>, _ino: u64, _fh: u64, _flags: i32, reply: ReplyEmpty) {
        reply.ok();
    }
}

/// Mount the hierarchy at the supplied path and block until unmounted.
pub fn mount(index: Arc<HierarchyIndex>, policy: &MountPolicy, at: &Path) -> Result<()> {
    let filesystem = StaticFuse::new(index, policy);
    let options = [
        MountOption::FSName(policy.fsname.clone()),
        MountOption::RO,
        MountOption::AutoUnmount,
    ];
    fuser::mount2(filesystem, at, &options).with_context(|| format!("mount {}", at.display()))
}
