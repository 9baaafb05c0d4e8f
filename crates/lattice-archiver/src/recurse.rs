// SPDX-License-Identifier: Apache-2.0
//! Batch ingest over a directory of conversation bundles (§4.6): the three
//! source modes the archiver is fed from.

use crate::archiver::Archiver;
use crate::bundle::{bundle_dirs, load_bundle};
use crate::error::ArchiveError;
use lattice_app_core::state::StateStore;
use std::path::PathBuf;

/// Which source root a batch of bundles is being read from, and how each
/// bundle should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// A full, sorted-output tree. Only titles not already indexed are
    /// imported; nothing is deleted from the source tree.
    Full,
    /// A `new_chats` delta tree. Every bundle is placed as a new
    /// conversation; its source folder is removed after a successful
    /// placement.
    NewChats,
    /// An `appending` delta tree. Every bundle must already be indexed
    /// under a matching id; its source folder is removed after a
    /// successful append.
    Appending,
}

/// Outcome of one bundle directory processed during a batch run.
#[derive(Debug, Clone)]
pub enum BundleOutcome {
    /// The bundle was placed (new or appended).
    Imported {
        /// The conversation title placed.
        title: String,
    },
    /// *full*-mode only: the title was already indexed, so the bundle was
    /// left untouched.
    Skipped {
        /// The conversation title that was skipped.
        title: String,
    },
    /// Placement failed; the batch continues to the next bundle rather
    /// than aborting (§7).
    Failed {
        /// The bundle directory that failed.
        path: PathBuf,
        /// A human-readable description of the failure.
        reason: String,
    },
}

/// Summary of a batch run over a source root.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per bundle directory scanned, in directory-name sort
    /// order.
    pub outcomes: Vec<BundleOutcome>,
}

impl BatchReport {
    /// Titles successfully imported (new or appended) during the run.
    pub fn imported_titles(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                BundleOutcome::Imported { title } => Some(title.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of bundles that failed placement.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, BundleOutcome::Failed { .. }))
            .count()
    }
}

/// Scan `source_root` non-recursively for bundle directories (each an
/// immediate subdirectory) and place each one according to `mode`.
///
/// Bundles are processed in directory-name sort order. A per-bundle failure
/// is recorded in the returned report and does not abort the run; only a
/// failure to scan `source_root` itself is returned as an error.
///
/// # Errors
///
/// Returns [`ArchiveError::MissingSource`] if `source_root` is not a
/// directory.
pub fn run_batch<S: StateStore>(
    archiver: &mut Archiver<S>,
    source_root: &std::path::Path,
    mode: SourceMode,
) -> Result<BatchReport, ArchiveError> {
    let mut report = BatchReport::default();
    for dir in bundle_dirs(source_root)? {
        let outcome = process_one(archiver, &dir, mode);
        report.outcomes.push(outcome);
    }
    Ok(report)
}

fn process_one<S: StateStore>(
    archiver: &mut Archiver<S>,
    dir: &std::path::Path,
    mode: SourceMode,
) -> BundleOutcome {
    let bundle = match load_bundle(dir) {
        Ok(bundle) => bundle,
        Err(err) => {
            return BundleOutcome::Failed {
                path: dir.to_path_buf(),
                reason: err.to_string(),
            }
        }
    };

    match mode {
        SourceMode::Full => {
            if archiver.index().contains(&bundle.title) {
                tracing::debug!(title = %bundle.title, "full mode: already indexed, skipping");
                return BundleOutcome::Skipped { title: bundle.title };
            }
            match archiver.store(&bundle, dir) {
                Ok(summary) => BundleOutcome::Imported {
                    title: summary.title,
                },
                Err(err) => BundleOutcome::Failed {
                    path: dir.to_path_buf(),
                    reason: err.to_string(),
                },
            }
        }
        SourceMode::NewChats => match archiver.store(&bundle, dir) {
            Ok(summary) => {
                remove_source_dir(dir);
                BundleOutcome::Imported {
                    title: summary.title,
                }
            }
            Err(err) => BundleOutcome::Failed {
                path: dir.to_path_buf(),
                reason: err.to_string(),
            },
        },
        SourceMode::Appending => match archiver.append(&bundle, dir) {
            Ok(summary) => {
                remove_source_dir(dir);
                BundleOutcome::Imported {
                    title: summary.title,
                }
            }
            Err(err) => BundleOutcome::Failed {
                path: dir.to_path_buf(),
                reason: err.to_string(),
            },
        },
    }
}

fn remove_source_dir(dir: &std::path::Path) {
    if let Err(err) = std::fs::remove_dir_all(dir) {
        tracing::warn!(path = %dir.display(), error = %err, "failed to remove bundle source after placement");
    }
}
