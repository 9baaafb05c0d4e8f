// SPDX-License-Identifier: Apache-2.0
//! Command-line front end for the lattice archive: place conversation
//! bundles along the walk, batch-import a source tree, restore a
//! conversation by title, and list what's indexed.
//!
//! This crate is a thin translation layer over [`lattice_archiver`]: no
//! placement or walk logic lives here, only argument parsing, archive-root
//! resolution, and human-readable output.
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
    clippy::dbg_macro
)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]
// This crate is the CLI's own output boundary.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lattice_archiver::{run_batch, Archiver, SourceMode};
use lattice_config_fs::FsStateStore;
use std::path::PathBuf;

/// Command-line front end for importing and restoring conversations from
/// the lattice archive.
#[derive(Parser)]
#[command(name = "lattice-cli", about = "Archive and restore conversations along a deterministic coordinate walk")]
pub struct Cli {
    /// Archive root directory. Created on first use if it does not exist.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// The action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands, corresponding to the archiver's four operating
/// modes.
#[derive(Subcommand)]
pub enum Command {
    /// Place a single conversation bundle's messages along the walk.
    StoreOne {
        /// Directory holding the conversation JSON file (and any
        /// attachment files referenced by it).
        bundle: PathBuf,
    },
    /// Replay an indexed conversation's walk and print its reconstructed
    /// `(user, assistant)` pairs.
    Restore {
        /// The conversation title to restore, as recorded in the index.
        title: String,
    },
    /// Batch-import every bundle directory under a source tree.
    RecurseStore {
        /// Which source tree this is, and how its bundles are placed.
        #[arg(value_enum)]
        mode: SourceModeArg,
        /// Source root, scanned non-recursively for bundle directories.
        source: PathBuf,
    },
    /// List every conversation title currently in the index.
    Browse,
}

/// `clap`-facing mirror of [`lattice_archiver::SourceMode`] (kebab-case
/// variant names on the command line).
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SourceModeArg {
    /// The full, sorted-output tree — only titles not already indexed are
    /// imported.
    Full,
    /// The `new_chats` delta tree — every bundle is placed as new.
    NewChats,
    /// The `appending` delta tree — every bundle must already be indexed.
    Appending,
}

impl From<SourceModeArg> for SourceMode {
    fn from(value: SourceModeArg) -> Self {
        match value {
            SourceModeArg::Full => SourceMode::Full,
            SourceModeArg::NewChats => SourceMode::NewChats,
            SourceModeArg::Appending => SourceMode::Appending,
        }
    }
}

/// Run the parsed CLI invocation to completion.
///
/// # Errors
///
/// Returns an error on any input-validation or I/O failure; the caller's
/// `main` is expected to translate that into a nonzero exit code.
pub fn run(cli: Cli) -> Result<()> {
    let state = FsStateStore::new(&cli.root)
        .with_context(|| format!("failed to open archive state at {}", cli.root.display()))?;
    let mut archiver = Archiver::open(&cli.root, state)
        .with_context(|| format!("failed to open archive at {}", cli.root.display()))?;

    match cli.command {
        Command::StoreOne { bundle } => store_one(&mut archiver, &bundle),
        Command::Restore { title } => restore(&archiver, &title),
        Command::RecurseStore { mode, source } => recurse_store(&mut archiver, &source, mode.into()),
        Command::Browse => browse(&archiver),
    }
}

fn store_one(archiver: &mut Archiver<FsStateStore>, bundle_dir: &std::path::Path) -> Result<()> {
    let bundle = lattice_archiver::load_bundle(bundle_dir)
        .with_context(|| format!("failed to load bundle at {}", bundle_dir.display()))?;
    let summary = archiver
        .store(&bundle, bundle_dir)
        .with_context(|| format!("failed to store conversation {:?}", bundle.title))?;
    println!(
        "stored {:?}: {} block(s), {} -> {}",
        summary.title, summary.blocks_written, summary.start, summary.end
    );
    Ok(())
}

fn restore(archiver: &Archiver<FsStateStore>, title: &str) -> Result<()> {
    let restorer = lattice_archiver::Restorer::new(archiver.block_store(), archiver.index());
    let blocks = restorer
        .restore(title)
        .with_context(|| format!("failed to restore {title:?}"))?;
    for restored in &blocks {
        println!("User: {}", restored.block.user);
        println!("Assistant: {}", restored.block.assistant);
        println!();
    }
    Ok(())
}

fn recurse_store(
    archiver: &mut Archiver<FsStateStore>,
    source: &std::path::Path,
    mode: SourceMode,
) -> Result<()> {
    let report = run_batch(archiver, source, mode)
        .with_context(|| format!("failed to scan source tree at {}", source.display()))?;
    for outcome in &report.outcomes {
        match outcome {
            lattice_archiver::BundleOutcome::Imported { title } => {
                println!("imported {title:?}");
            }
            lattice_archiver::BundleOutcome::Skipped { title } => {
                println!("skipped {title:?} (already indexed)");
            }
            lattice_archiver::BundleOutcome::Failed { path, reason } => {
                println!("failed {}: {reason}", path.display());
            }
        }
    }
    println!(
        "done: {} imported, {} failed",
        report.imported_titles().len(),
        report.failure_count()
    );
    if report.failure_count() > 0 {
        anyhow::bail!(
            "{} bundle(s) failed during batch import",
            report.failure_count()
        );
    }
    Ok(())
}

fn browse(archiver: &Archiver<FsStateStore>) -> Result<()> {
    let restorer = lattice_archiver::Restorer::new(archiver.block_store(), archiver.index());
    for title in restorer.titles() {
        println!("{title}");
    }
    Ok(())
}
