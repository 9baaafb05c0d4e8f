// SPDX-License-Identifier: Apache-2.0
//! Import orchestration: walks a [`PathWalker`], writes [`Block`]s, and
//! keeps the [`ConversationIndex`] and cursor up to date.

use crate::bundle::ConversationBundle;
use crate::error::ArchiveError;
use crate::index::{ConversationIndex, IndexEntry};
use lattice_app_core::state::{StateService, StateStore};
use lattice_coord::Coordinate;
use lattice_store::{Block, BlockStore};
use lattice_walk::PathWalker;
use serde::{Deserialize, Serialize};
use std::path::Path;

const INDEX_KEY: &str = "conversation_index";
const CURSOR_KEY: &str = "current_coord";

#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    current: String,
}

/// Outcome of placing one conversation's messages along the walk.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementSummary {
    /// The conversation title placed.
    pub title: String,
    /// Canonical coordinate string the conversation starts at.
    pub start: String,
    /// Canonical coordinate string of the next step after the last block
    /// written.
    pub end: String,
    /// Number of (user, assistant) blocks written.
    pub blocks_written: usize,
}

/// Orchestrates import: seeds/replays a [`PathWalker`] per conversation,
/// writes blocks through a [`BlockStore`], and persists the
/// [`ConversationIndex`] and cursor through a [`StateStore`].
pub struct Archiver<S> {
    store: BlockStore,
    state: StateService<S>,
    index: ConversationIndex,
    cursor: Coordinate,
}

impl<S: StateStore> Archiver<S> {
    /// Open an archiver rooted at `root`, loading any previously persisted
    /// index and cursor from `state` (absent state defaults to an empty
    /// index and the zero coordinate).
    pub fn open(root: impl Into<std::path::PathBuf>, state: S) -> Result<Self, ArchiveError> {
        let store = BlockStore::new(root.into());
        let state = StateService::new(state);
        let index: ConversationIndex = state.load(INDEX_KEY)?.unwrap_or_default();
        let cursor = match state.load::<CursorFile>(CURSOR_KEY)? {
            Some(file) => Coordinate::parse(&file.current)?,
            None => Coordinate::ZERO,
        };
        Ok(Self {
            store,
            state,
            index,
            cursor,
        })
    }

    /// The conversation index as it currently stands in memory.
    pub fn index(&self) -> &ConversationIndex {
        &self.index
    }

    /// The underlying block store, for read access (e.g. by a
    /// [`crate::restorer::Restorer`]).
    pub fn block_store(&self) -> &BlockStore {
        &self.store
    }

    /// Place `bundle`'s messages, dispatching on whether `bundle.title` is
    /// already indexed under a matching id: if so, appends (retracing to
    /// the indexed `end` first); otherwise starts a new conversation at the
    /// current cursor, overwriting any stale index entry for the title.
    pub fn store(
        &mut self,
        bundle: &ConversationBundle,
        attachments_source: &Path,
    ) -> Result<PlacementSummary, ArchiveError> {
        match self.index.get(&bundle.title).cloned() {
            Some(entry) if entry.id == bundle.id => self.append_from(bundle, attachments_source, &entry),
            _ => self.store_new(bundle, attachments_source),
        }
    }

    /// Place `bundle`'s messages as an append to an already-indexed
    /// conversation, requiring `bundle.title` to already have an entry with
    /// a matching id.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::NotIndexedForAppend`] if no such entry
    /// exists.
    pub fn append(
        &mut self,
        bundle: &ConversationBundle,
        attachments_source: &Path,
    ) -> Result<PlacementSummary, ArchiveError> {
        let entry = self
            .index
            .get(&bundle.title)
            .filter(|entry| entry.id == bundle.id)
            .cloned()
            .ok_or_else(|| ArchiveError::NotIndexedForAppend {
                title: bundle.title.clone(),
            })?;
        self.append_from(bundle, attachments_source, &entry)
    }

    fn store_new(
        &mut self,
        bundle: &ConversationBundle,
        attachments_source: &Path,
    ) -> Result<PlacementSummary, ArchiveError> {
        let start = self.cursor;
        let walker = PathWalker::new(start, &bundle.id);
        tracing::info!(title = %bundle.title, start = %start, "storing new conversation");
        self.place(bundle, attachments_source, start, start, walker, 0)
    }

    fn append_from(
        &mut self,
        bundle: &ConversationBundle,
        attachments_source: &Path,
        entry: &IndexEntry,
    ) -> Result<PlacementSummary, ArchiveError> {
        let start = Coordinate::parse(&entry.start)?;
        let end = Coordinate::parse(&entry.end)?;
        let (current, walker, placed) = retrace(&self.store, start, &bundle.id, end)?;
        tracing::info!(title = %bundle.title, resume_at = %current, already_placed = placed, "appending to conversation");
        self.place(bundle, attachments_source, start, current, walker, placed)
    }

    fn place(
        &mut self,
        bundle: &ConversationBundle,
        attachments_source: &Path,
        start: Coordinate,
        mut current: Coordinate,
        mut walker: PathWalker,
        skip_pairs: usize,
    ) -> Result<PlacementSummary, ArchiveError> {
        let mut blocks_written = 0usize;
        for (user, assistant) in bundle.pairs().into_iter().skip(skip_pairs) {
            let universe = walker.imag();
            let attachments: Vec<String> = bundle
                .attachments
                .iter()
                .filter(|a| user.contains(a.as_str()) || assistant.contains(a.as_str()))
                .cloned()
                .collect();
            let block = Block::new(user, assistant, universe).with_attachments(attachments);
            self.store.write(&current, block, Some(attachments_source))?;
            tracing::debug!(coordinate = %current, universe, "wrote block");
            blocks_written += 1;

            current = walker.step();
            self.cursor = current;
            self.save_cursor()?;
        }

        self.index.insert(
            bundle.title.clone(),
            IndexEntry {
                id: bundle.id.clone(),
                start: start.format(),
                end: current.format(),
            },
        );
        self.save_index()?;

        Ok(PlacementSummary {
            title: bundle.title.clone(),
            start: start.format(),
            end: current.format(),
            blocks_written,
        })
    }

    fn save_cursor(&self) -> Result<(), ArchiveError> {
        self.state.save(
            CURSOR_KEY,
            &CursorFile {
                current: self.cursor.format(),
            },
        )?;
        Ok(())
    }

    fn save_index(&self) -> Result<(), ArchiveError> {
        self.state.save(INDEX_KEY, &self.index)?;
        Ok(())
    }
}

/// Replay a walker from `start` seeded with `key` until it reaches `end`,
/// verifying along the way that a block actually exists at every
/// intermediate coordinate for the universe the walker expects — a
/// desynced replay (missing expected block) aborts rather than silently
/// continuing.
///
/// Returns the walker's state at `end` alongside the number of steps taken
/// to get there — equivalently, the number of message pairs already placed
/// for this conversation, which the caller skips before placing the rest
/// of the bundle's pairs.
///
/// # Errors
///
/// Returns [`ArchiveError::WalkDesync`] if an expected block is missing.
pub(crate) fn retrace(
    store: &BlockStore,
    start: Coordinate,
    key: &str,
    end: Coordinate,
) -> Result<(Coordinate, PathWalker, usize), ArchiveError> {
    let mut walker = PathWalker::new(start, key);
    let mut coord = start;
    let mut steps = 0usize;
    while coord != end {
        let universe = walker.imag();
        let bucket = store.read(&coord);
        if !bucket.iter().any(|b| b.universe == universe) {
            return Err(ArchiveError::WalkDesync {
                coordinate: coord.format(),
                universe,
            });
        }
        coord = walker.step();
        steps += 1;
    }
    Ok((coord, walker, steps))
}
