// SPDX-License-Identifier: Apache-2.0
//! Shared persistence services for lattice tools: a storage port plus a
//! thin service that serializes/deserializes state on top of it.
//!
//! Kept separate from [`lattice_config_fs`](../lattice_config_fs/index.html),
//! which provides the filesystem implementation of [`state::StateStore`] —
//! this crate only defines the port and the generic service, so alternate
//! backends (in-memory, for tests; something networked, later) can be
//! swapped in without touching the archiver.

pub mod state;
