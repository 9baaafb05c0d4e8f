// SPDX-License-Identifier: Apache-2.0
//! CLI entry point. Exits 0 on success; any input-validation or I/O failure
//! surfaces as a nonzero exit with the error printed via `anyhow`'s chained
//! `Debug` output.

use anyhow::Result;
use clap::Parser;
use lattice_cli::{run, Cli};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    run(cli)
}
