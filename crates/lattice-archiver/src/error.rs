// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for import/restore orchestration.

use std::path::PathBuf;

/// Errors produced by the archiver and restorer.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// A coordinate string failed to parse.
    #[error(transparent)]
    Coordinate(#[from] lattice_coord::CoordinateError),
    /// The block store refused an operation.
    #[error(transparent)]
    Store(#[from] lattice_store::StoreError),
    /// The state store refused an operation.
    #[error(transparent)]
    State(#[from] lattice_app_core::state::StateError),
    /// I/O failed while reading a conversation bundle.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A conversation bundle's JSON failed to parse.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// `path` does not contain a conversation JSON file.
    #[error("no conversation JSON found under {}", path.display())]
    MissingSource {
        /// The bundle directory that was scanned.
        path: PathBuf,
    },
    /// A restore was requested for a title not present in the index.
    #[error("no conversation indexed under title {title:?}")]
    UnknownTitle {
        /// The title that was looked up.
        title: String,
    },
    /// An append was requested for a title with no matching indexed entry.
    #[error("{title:?} is not indexed under a matching id; cannot append")]
    NotIndexedForAppend {
        /// The title that was looked up.
        title: String,
    },
    /// The walker's expected universe was not found among the blocks stored
    /// at a coordinate it was replaying through.
    #[error("walk desync at coordinate {coordinate}: expected universe {universe} is not stored there")]
    WalkDesync {
        /// Canonical form of the coordinate where the desync was detected.
        coordinate: String,
        /// The universe the walker expected to find.
        universe: u32,
    },
}
