// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Derive protocol attribute sets from hierarchy entries.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use fuser::{FileAttr, FileType};

use crate::hierarchy::Entry;

/// Block size reported for every entry.
pub const BLOCK_SIZE: u32 = 1024;
/// Nominal size reported for directories; the protocol requires a non-error
/// size value even though directories carry no bytes in this model.
pub const DIR_NOMINAL_SIZE: u64 = 10;
/// Owner uid reported for every entry.
pub const OWNER_UID: u32 = 1000;
/// Owner gid reported for every entry.
pub const OWNER_GID: u32 = 1000;

const DIR_PERM: u16 = 0o755;
const FILE_PERM: u16 = 0o644;

/// Protocol file type tag for the entry.
#[must_use]
pub fn file_type(entry: &Entry) -> FileType {
    if entry.is_dir() {
        FileType::Directory
    } else {
        FileType::RegularFile
    }
}

/// Permission bits without the type tag.
#[must_use]
pub fn perm(entry: &Entry) -> u16 {
    if entry.is_dir() {
        DIR_PERM
    } else {
        FILE_PERM
    }
}

/// Full mode bits including the type tag.
#[must_use]
pub fn mode(entry: &Entry) -> u32 {
    if entry.is_dir() {
        libc::S_IFDIR as u32 | u32::from(DIR_PERM)
    } else {
        libc::S_IFREG as u32 | u32::from(FILE_PERM)
    }
}

/// Size in bytes: payload length for files, [`DIR_NOMINAL_SIZE`] for
/// directories.
#[must_use]
pub fn size(entry: &Entry) -> u64 {
    if entry.is_dir() {
        DIR_NOMINAL_SIZE
    } else {
        entry.payload().len() as u64
    }
}

/// Blocks of [`BLOCK_SIZE`] covering the size, rounded up so a non-zero
/// size never reports zero blocks.
#[must_use]
pub fn block_count(entry: &Entry) -> u64 {
    size(entry).div_ceil(u64::from(BLOCK_SIZE))
}

/// Bundle the externally visible attribute set for the entry. All four time
/// attributes carry the entry timestamp.
#[must_use]
pub fn attributes(entry: &Entry) -> FileAttr {
    let timestamp = entry.timestamp();
    FileAttr {
        ino: entry.ino(),
        size: size(entry),
        blocks: block_count(entry),
        atime: timestamp,
        mtime: timestamp,
        ctime: timestamp,
        crtime: timestamp,
        kind: file_type(entry),
        perm: perm(entry),
        nlink: 1,
        uid: OWNER_UID,
        gid: OWNER_GID,
        rdev: 0,
        flags: 0,
        blksize: BLOCK_SIZE,
    }
}
