// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate staticfs hierarchy construction and consistency checks.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::time::SystemTime;

use staticfs::hierarchy::{
    join_path, Entry, HierarchyBuilder, HierarchyError, HierarchyIndex, ROOT_INODE,
};

fn sample_index() -> HierarchyIndex {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate(
            "/",
            vec![
                Entry::directory("sub", 2, now),
                Entry::file("a", 11, now, b"hi\n".to_vec()),
            ],
        )
        .expect("populate root");
    builder
        .populate("/sub", vec![Entry::file("b", 12, now, b"below\n".to_vec())])
        .expect("populate sub");
    builder.build().expect("build index")
}

#[test]
fn flat_view_covers_root_and_every_child() {
    let index = sample_index();
    let root = index.resolve_flat("/").expect("root entry");
    assert!(root.is_dir());
    assert_eq!(root.ino(), ROOT_INODE);
    for path in ["/sub", "/a", "/sub/b"] {
        assert!(index.resolve_flat(path).is_some(), "missing {path}");
    }
    assert_eq!(index.entry_count(), 4);
}

#[test]
fn tree_membership_distinguishes_directories_from_files() {
    let index = sample_index();
    assert!(index.resolve_children("/").is_some());
    assert!(index.resolve_children("/sub").is_some());
    assert!(index.resolve_children("/a").is_none());
    assert!(index.resolve_children("/sub/b").is_none());
    assert!(index.resolve_children("/absent").is_none());
}

#[test]
fn children_keep_declaration_order() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate(
            "/",
            vec![
                Entry::file("zeta", 10, now, Vec::new()),
                Entry::file("alpha", 20, now, Vec::new()),
                Entry::file("mid", 30, now, Vec::new()),
            ],
        )
        .expect("populate root");
    let index = builder.build().expect("build index");
    let names: Vec<&str> = index
        .resolve_children("/")
        .expect("root children")
        .iter()
        .map(|child| child.name())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn inode_view_maps_every_entry() {
    let index = sample_index();
    assert_eq!(index.path_of(ROOT_INODE), Some("/"));
    assert_eq!(index.path_of(2), Some("/sub"));
    assert_eq!(index.path_of(12), Some("/sub/b"));
    assert_eq!(index.path_of(999), None);
}

#[test]
fn duplicate_full_path_fails_the_build() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate(
            "/",
            vec![
                Entry::file("a", 11, now, Vec::new()),
                Entry::file("a", 12, now, Vec::new()),
            ],
        )
        .expect("populate root");
    let err = builder.build().expect_err("duplicate path must fail");
    assert_eq!(err, HierarchyError::DuplicatePath("/a".to_owned()));
}

#[test]
fn duplicate_inode_fails_the_build() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate(
            "/",
            vec![
                Entry::file("a", 11, now, Vec::new()),
                Entry::file("b", 11, now, Vec::new()),
            ],
        )
        .expect("populate root");
    let err = builder.build().expect_err("duplicate inode must fail");
    assert!(matches!(
        err,
        HierarchyError::DuplicateInode { ino: 11, .. }
    ));
}

#[test]
fn duplicate_parent_declaration_is_rejected() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate("/", vec![Entry::file("a", 11, now, Vec::new())])
        .expect("first declaration");
    let err = builder
        .populate("/", vec![Entry::file("b", 12, now, Vec::new())])
        .expect_err("second declaration must fail");
    assert_eq!(err, HierarchyError::DuplicateParent("/".to_owned()));
}

#[test]
fn undeclared_tree_key_fails_the_build() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate("/typo", vec![Entry::file("b", 12, now, Vec::new())])
        .expect("populate typo");
    let err = builder.build().expect_err("undeclared key must fail");
    assert_eq!(err, HierarchyError::MissingDirectory("/typo".to_owned()));
}

#[test]
fn tree_key_naming_a_file_fails_the_build() {
    let now = SystemTime::now();
    let mut builder = HierarchyBuilder::new(now);
    builder
        .populate("/", vec![Entry::file("a", 11, now, Vec::new())])
        .expect("populate root");
    builder
        .populate("/a", vec![Entry::file("b", 12, now, Vec::new())])
        .expect("populate file key");
    let err = builder.build().expect_err("file tree key must fail");
    assert_eq!(err, HierarchyError::MissingDirectory("/a".to_owned()));
}

#[test]
fn invalid_child_names_are_rejected() {
    let now = SystemTime::now();
    for name in ["", ".", "..", "with/slash", "nul\0byte"] {
        let mut builder = HierarchyBuilder::new(now);
        let err = builder
            .populate("/", vec![Entry::file(name, 11, now, Vec::new())])
            .expect_err("invalid name must fail");
        assert!(matches!(err, HierarchyError::InvalidName { .. }), "{name:?}");
    }
}

#[test]
fn join_path_handles_the_root_parent() {
    assert_eq!(join_path("/", "a"), "/a");
    assert_eq!(join_path("/sub", "b"), "/sub/b");
}
