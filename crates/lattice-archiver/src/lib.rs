// SPDX-License-Identifier: Apache-2.0
//! Import and restore orchestration for the lattice archive.
//!
//! [`archiver::Archiver`] places a conversation's messages along a
//! [`lattice_walk::PathWalker`], writing through a [`lattice_store::BlockStore`]
//! and persisting the [`index::ConversationIndex`] and cursor through a
//! [`lattice_app_core::state::StateStore`]. [`restorer::Restorer`] replays
//! the inverse: given a title, it walks the same path and reads back the
//! blocks that were written along it.
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

pub mod archiver;
pub mod bundle;
pub mod error;
pub mod index;
pub mod recurse;
pub mod restorer;

pub use archiver::{Archiver, PlacementSummary};
pub use bundle::{bundle_dirs, load_bundle, ConversationBundle, Message};
pub use error::ArchiveError;
pub use index::{ConversationIndex, IndexEntry};
pub use recurse::{run_batch, BatchReport, BundleOutcome, SourceMode};
pub use restorer::{RestoredBlock, Restorer};
