// SPDX-License-Identifier: Apache-2.0
//! Sharded, coordinate-addressed block store for the lattice archive.
//!
//! [`BlockStore`] persists one [`Block`] per `(coordinate, universe)` pair to
//! a directory tree keyed by coordinate digits. Multiple blocks can land on
//! the same coordinate — the `universe` field disambiguates them, and a
//! write that would collide with an existing universe is transparently
//! reassigned to `max(existing) + 1` rather than overwriting.
//!
//! # Shard Layout
//!
//! Given canonical coordinate `"d5 d4 d3 d2 d1 d0"`, the bucket lives at
//! `<root>/data/d0/d1/d2/d3/d4.json` — a JSON object mapping the full
//! coordinate string to its ordered list of blocks. Note that `d5` never
//! appears in the path, only in the bucket key: two coordinates differing
//! only in `d5` share a shard file but occupy distinct top-level keys in it.
//! Attachments for a coordinate live alongside that shard, under
//! `attachments/<coord-with-dashes>/`.
//!
//! # Determinism Invariant
//!
//! Bucket files are rewritten whole on every write, with top-level keys
//! sorted ascending by string and blocks within a bucket sorted ascending
//! by universe — this keeps the tree diff-friendly across runs.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use lattice_coord::Coordinate;
use serde::{Deserialize, Serialize};

/// One message-pair record stored at a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The user's message text.
    pub user: String,
    /// The assistant's reply text (empty string for a trailing unmatched
    /// user message).
    pub assistant: String,
    /// The walker's imaginary register at the step this block was placed —
    /// disambiguates multiple blocks sharing a coordinate.
    pub universe: u32,
    /// Attachment filenames referenced by this pair, in the order they were
    /// detected.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    /// Opaque per-level payloads attached after the fact via [`BlockStore::add_layer`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layers: BTreeMap<String, serde_json::Value>,
    /// Opaque auxiliary payload, preserved but not interpreted by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Opaque connection references, preserved but not interpreted by the core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<String>>,
}

impl Block {
    /// Build a block for a single message pair at the given universe, with
    /// no attachments, layers, data, or connections.
    pub fn new(user: impl Into<String>, assistant: impl Into<String>, universe: u32) -> Self {
        Self {
            user: user.into(),
            assistant: assistant.into(),
            universe,
            attachments: Vec::new(),
            layers: BTreeMap::new(),
            data: None,
            connections: None,
        }
    }

    /// Attach a list of filenames detected for this message pair.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// All blocks stored at one coordinate, ordered ascending by universe.
pub type Bucket = Vec<Block>;

type ShardFile = BTreeMap<String, Bucket>;

/// Errors produced by [`BlockStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The shard at `path` could not be parsed and the write was refused
    /// rather than silently overwriting coordinates that share the shard.
    #[error("shard {path} is corrupted; refusing to overwrite it")]
    CorruptBucket {
        /// Path of the unparsable shard file.
        path: PathBuf,
    },
    /// Serialization of a shard to JSON failed.
    #[error("failed to serialize shard: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Sharded, coordinate-addressed block store rooted at a directory.
pub struct BlockStore {
    root: PathBuf,
}

impl BlockStore {
    /// Open (or prepare to create) a store rooted at `root`. Does not touch
    /// the filesystem until the first read/write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory this store is anchored at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Shard directory, shard JSON path, and bucket key for `coord`.
    fn shard_paths(&self, coord: &Coordinate) -> (PathBuf, PathBuf, String) {
        let full_key = coord.format();
        let parts: Vec<&str> = full_key.split_whitespace().collect();
        // parts = [d5, d4, d3, d2, d1, d0]
        let (d5, d4, d3, d2, d1, d0) = (parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]);
        let _ = d5; // never used in the path, only in the bucket key
        let dir = self.root.join("data").join(d0).join(d1).join(d2).join(d3);
        let json_path = dir.join(format!("{d4}.json"));
        (dir, json_path, full_key)
    }

    fn load_for_read(path: &Path) -> ShardFile {
        let Ok(bytes) = std::fs::read(path) else {
            return ShardFile::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(shard) => shard,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "corrupt shard, treating as empty");
                ShardFile::new()
            }
        }
    }

    fn load_for_write(path: &Path) -> Result<ShardFile, StoreError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(ShardFile::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        serde_json::from_slice(&bytes).map_err(|_| StoreError::CorruptBucket {
            path: path.to_path_buf(),
        })
    }

    fn persist(path: &Path, shard: &ShardFile) -> Result<(), StoreError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut ser = serde_json::Serializer::with_formatter(
                &mut tmp,
                serde_json::ser::PrettyFormatter::with_indent(b"    "),
            );
            serde::Serialize::serialize(shard, &mut ser)?;
            tmp.flush()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write `block` at `coord`. If `block.universe` already exists in the
    /// shard's bucket, it is reassigned to `max(existing) + 1` before
    /// insertion (logged at warn level). Returns the block as actually
    /// stored (with its possibly-reassigned universe).
    ///
    /// If `attachments_source` is given, each filename in
    /// `block.attachments` is copied from that directory into the
    /// coordinate's attachment folder; a missing source file is logged as a
    /// warning, not an error, and the filename stays listed regardless.
    pub fn write(
        &self,
        coord: &Coordinate,
        mut block: Block,
        attachments_source: Option<&Path>,
    ) -> Result<Block, StoreError> {
        let (dir, json_path, full_key) = self.shard_paths(coord);
        std::fs::create_dir_all(&dir)?;

        let mut shard = Self::load_for_write(&json_path)?;
        let bucket = shard.entry(full_key.clone()).or_default();
        if let Some(max_universe) = bucket.iter().map(|b| b.universe).max() {
            if bucket.iter().any(|b| b.universe == block.universe) {
                let reassigned = max_universe + 1;
                tracing::warn!(
                    coordinate = %full_key,
                    old_universe = block.universe,
                    new_universe = reassigned,
                    "universe collision, reassigning"
                );
                block.universe = reassigned;
            }
        }
        bucket.push(block.clone());
        bucket.sort_by_key(|b| b.universe);
        Self::persist(&json_path, &shard)?;

        if let Some(src_dir) = attachments_source {
            if !block.attachments.is_empty() {
                let att_dir = dir.join("attachments").join(full_key.replace(' ', "-"));
                std::fs::create_dir_all(&att_dir)?;
                for fname in &block.attachments {
                    let src = src_dir.join(fname);
                    let dst = att_dir.join(fname);
                    if dst.exists() {
                        continue;
                    }
                    if src.exists() {
                        std::fs::copy(&src, &dst)?;
                    } else {
                        tracing::warn!(attachment = %fname, coordinate = %full_key, "attachment source missing");
                    }
                }
            }
        }

        Ok(block)
    }

    /// Read the bucket at `coord`, or an empty list if absent or the shard
    /// is corrupt.
    pub fn read(&self, coord: &Coordinate) -> Bucket {
        let (_, json_path, full_key) = self.shard_paths(coord);
        Self::load_for_read(&json_path)
            .remove(&full_key)
            .unwrap_or_default()
    }

    /// Whether any block exists at `coord`.
    pub fn exists(&self, coord: &Coordinate) -> bool {
        !self.read(coord).is_empty()
    }

    /// Attach `payload` under `level` to the block at `coord` whose universe
    /// matches `universe`. Returns `false` (no-op) if no such block exists.
    pub fn add_layer(
        &self,
        coord: &Coordinate,
        universe: u32,
        level: u32,
        payload: serde_json::Value,
    ) -> Result<bool, StoreError> {
        let (dir, json_path, full_key) = self.shard_paths(coord);
        std::fs::create_dir_all(&dir)?;
        let mut shard = Self::load_for_write(&json_path)?;
        let bucket = shard.entry(full_key.clone()).or_default();
        let Some(block) = bucket.iter_mut().find(|b| b.universe == universe) else {
            return Ok(false);
        };
        block.layers.insert(level.to_string(), payload);
        Self::persist(&json_path, &shard)?;
        Ok(true)
    }
}
