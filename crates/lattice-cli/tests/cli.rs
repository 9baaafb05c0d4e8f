// SPDX-License-Identifier: Apache-2.0
//! End-to-end exercises of the CLI's `run` entry point against a real
//! temporary archive directory.

use clap::Parser;
use lattice_cli::{run, Cli};
use std::fs;

fn write_bundle(root: &std::path::Path, dir_name: &str, title: &str, id: &str, pairs: &[(&str, &str)]) {
    let dir = root.join(dir_name);
    fs::create_dir_all(&dir).expect("mkdir");
    let mut messages = Vec::new();
    for (user, assistant) in pairs {
        messages.push(serde_json::json!({"role": "user", "content": user}));
        messages.push(serde_json::json!({"role": "assistant", "content": assistant}));
    }
    let json = serde_json::json!({
        "title": title,
        "id": id,
        "attachments": [],
        "messages": messages,
    });
    fs::write(
        dir.join("conversation.json"),
        serde_json::to_vec_pretty(&json).expect("serialize"),
    )
    .expect("write json");
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("lattice-cli").chain(args.iter().copied()))
        .expect("parse args")
}

#[test]
fn store_one_then_restore_round_trips() {
    let archive = tempfile::tempdir().expect("archive dir");
    let bundles = tempfile::tempdir().expect("bundle dir");
    write_bundle(
        bundles.path(),
        "trip",
        "Trip Planning",
        "conv-1",
        &[("where to", "the coast")],
    );

    let root = archive.path().to_string_lossy().into_owned();
    let bundle_dir = bundles.path().join("trip").to_string_lossy().into_owned();

    run(parse(&["--root", &root, "store-one", &bundle_dir])).expect("store-one");
    run(parse(&["--root", &root, "restore", "Trip Planning"])).expect("restore");
}

#[test]
fn restore_unknown_title_fails() {
    let archive = tempfile::tempdir().expect("archive dir");
    let root = archive.path().to_string_lossy().into_owned();
    let err = run(parse(&["--root", &root, "restore", "Nope"])).unwrap_err();
    assert!(err.to_string().contains("Nope"));
}

#[test]
fn browse_lists_indexed_titles() {
    let archive = tempfile::tempdir().expect("archive dir");
    let bundles = tempfile::tempdir().expect("bundle dir");
    write_bundle(bundles.path(), "one", "Alpha", "id-a", &[("hi", "hello")]);

    let root = archive.path().to_string_lossy().into_owned();
    let bundle_dir = bundles.path().join("one").to_string_lossy().into_owned();
    run(parse(&["--root", &root, "store-one", &bundle_dir])).expect("store-one");
    run(parse(&["--root", &root, "browse"])).expect("browse");
}

#[test]
fn recurse_store_full_mode_imports_then_skips() {
    let archive = tempfile::tempdir().expect("archive dir");
    let source = tempfile::tempdir().expect("source dir");
    write_bundle(source.path(), "a", "Alpha", "id-a", &[("hi", "hello")]);
    write_bundle(source.path(), "b", "Beta", "id-b", &[("yo", "hey")]);

    let root = archive.path().to_string_lossy().into_owned();
    let source_root = source.path().to_string_lossy().into_owned();

    run(parse(&[
        "--root",
        &root,
        "recurse-store",
        "full",
        &source_root,
    ]))
    .expect("first batch");

    // Second pass over the same source tree: both titles already indexed,
    // nothing fails.
    run(parse(&[
        "--root",
        &root,
        "recurse-store",
        "full",
        &source_root,
    ]))
    .expect("second batch");
}

#[test]
fn recurse_store_new_chats_then_appending() {
    let archive = tempfile::tempdir().expect("archive dir");
    let new_chats = tempfile::tempdir().expect("new chats dir");
    write_bundle(new_chats.path(), "grow", "Growing", "id-g", &[("a1", "a2")]);

    let root = archive.path().to_string_lossy().into_owned();
    let new_chats_root = new_chats.path().to_string_lossy().into_owned();
    run(parse(&[
        "--root",
        &root,
        "recurse-store",
        "new-chats",
        &new_chats_root,
    ]))
    .expect("new-chats batch");
    assert!(!new_chats.path().join("grow").exists());

    let appending = tempfile::tempdir().expect("appending dir");
    write_bundle(
        appending.path(),
        "grow-append",
        "Growing",
        "id-g",
        &[("a1", "a2"), ("b1", "b2")],
    );
    let appending_root = appending.path().to_string_lossy().into_owned();
    run(parse(&[
        "--root",
        &root,
        "recurse-store",
        "appending",
        &appending_root,
    ]))
    .expect("appending batch");
    assert!(!appending.path().join("grow-append").exists());
}
