// SPDX-License-Identifier: Apache-2.0
//! Restore orchestration: replays a conversation's walk and reads back the
//! blocks it wrote.

use crate::error::ArchiveError;
use crate::index::ConversationIndex;
use lattice_coord::Coordinate;
use lattice_store::{Block, BlockStore};
use lattice_walk::PathWalker;
use serde::Serialize;

/// One block recovered during a restore, tagged with the coordinate and
/// universe it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct RestoredBlock {
    /// Canonical coordinate string the block was stored at.
    pub coordinate: String,
    /// The universe (walker `imag` at placement time) it was stored under.
    pub universe: u32,
    /// The block itself.
    pub block: Block,
}

/// Replays conversations' walks against a [`BlockStore`] using a
/// [`ConversationIndex`] to find each conversation's seed.
pub struct Restorer<'a> {
    store: &'a BlockStore,
    index: &'a ConversationIndex,
}

impl<'a> Restorer<'a> {
    /// Build a restorer over `store`, using `index` to resolve titles.
    pub fn new(store: &'a BlockStore, index: &'a ConversationIndex) -> Self {
        Self { store, index }
    }

    /// Replay `title`'s walk from its indexed start to its indexed end,
    /// reading back every block along the way.
    ///
    /// An empty bucket at some coordinate strictly before the indexed end
    /// stops the replay and returns the blocks recovered so far, rather than
    /// failing the whole restore — this tolerates a shard that was lost or
    /// never written. A *non-empty* bucket that lacks the walker's expected
    /// universe is a genuine desync (the shard exists but doesn't agree with
    /// the walk) and is reported as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnknownTitle`] if `title` isn't indexed, or
    /// [`ArchiveError::WalkDesync`] if a non-empty bucket at some coordinate
    /// strictly before the indexed end doesn't contain the expected universe.
    pub fn restore(&self, title: &str) -> Result<Vec<RestoredBlock>, ArchiveError> {
        let entry = self
            .index
            .get(title)
            .ok_or_else(|| ArchiveError::UnknownTitle {
                title: title.to_string(),
            })?;
        let mut coord = Coordinate::parse(&entry.start)?;
        let end = Coordinate::parse(&entry.end)?;
        let mut walker = PathWalker::new(coord, &entry.id);

        let mut out = Vec::new();
        while coord != end {
            let universe = walker.imag();
            let mut bucket = self.store.read(&coord);
            if bucket.is_empty() {
                break;
            }
            let Some(pos) = bucket.iter().position(|b| b.universe == universe) else {
                return Err(ArchiveError::WalkDesync {
                    coordinate: coord.format(),
                    universe,
                });
            };
            let block = bucket.swap_remove(pos);
            out.push(RestoredBlock {
                coordinate: coord.format(),
                universe,
                block,
            });
            coord = walker.step();
        }
        Ok(out)
    }

    /// All indexed titles, in the same case-insensitive order the index
    /// persists them in.
    pub fn titles(&self) -> Vec<&str> {
        self.index.iter().map(|(title, _)| title).collect()
    }
}
