// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Bootstrap the built-in staticfs demo namespace.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::time::SystemTime;

use crate::hierarchy::{Entry, HierarchyBuilder, HierarchyError, HierarchyIndex};

/// Build the demo namespace served by the staticfs binary: three files under
/// the root plus a subdirectory holding three more.
pub fn demo_hierarchy() -> Result<HierarchyIndex, HierarchyError> {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder.populate(
        "/",
        vec![
            Entry::directory("subdirectory1", 1002, now),
            Entry::file("file1", 11, now, b"test content 1\r\n".to_vec()),
            Entry::file("file2", 22, now, b"test content 2\r\n".to_vec()),
            Entry::file("file3", 33, now, b"test content 3\r\n".to_vec()),
        ],
    )?;
    builder.populate(
        "/subdirectory1",
        vec![
            Entry::file("file4", 44, now, b"test content 4\r\n".to_vec()),
            Entry::file("file5", 55, now, b"test content 5\r\n".to_vec()),
            Entry::file("file6", 66, now, b"test content 6\r\n".to_vec()),
        ],
    )?;
    builder.build()
}
