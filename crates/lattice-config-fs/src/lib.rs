// SPDX-License-Identifier: Apache-2.0
//! Filesystem-backed [`StateStore`] rooted at an explicit directory — the
//! archive root passed on the CLI, not a platform config directory, since
//! archiver state (the conversation index, the restore cursor) belongs next
//! to the archive it describes.
//!
//! Keys map straight onto the archive root's well-known file names
//! (`conversation_index` → `<root>/conversation_index.json`, `current_coord`
//! → `<root>/current_coord.json`) so the files an implementer finds on disk
//! match the names a reader of the archive would expect.

use lattice_app_core::state::{StateError, StateStore};
use std::fs;
use std::path::PathBuf;

/// Stores state blobs as JSON files directly under `<root>/<key>.json`, with
/// atomic (write-temp-then-rename) writes.
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    /// Create a store rooted at `root`, creating the directory if it does
    /// not yet exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StateError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl StateStore for FsStateStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StateError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(StateError::NotFound),
            Err(err) => Err(StateError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StateError> {
        let path = self.path_for(key);
        let dir = self.root.clone();
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        std::io::Write::write_all(&mut tmp, data)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }
}
