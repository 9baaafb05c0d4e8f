// SPDX-License-Identifier: Apache-2.0
//! Storage port and service for archiver state (the conversation index and
//! the restore cursor).

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw state blobs, keyed by logical name (e.g.
/// `"conversation-index"`, `"cursor"`).
///
/// Implementations decide where the bytes live; [`lattice-config-fs`] is the
/// filesystem implementation used by the CLI.
pub trait StateStore {
    /// Load a raw blob. Returns `NotFound` when `key` has never been saved.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, StateError>;
    /// Persist a raw blob, replacing any existing value for `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), StateError>;
}

/// Error type for state operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// Key not present in the store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant for store-specific failures.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes state values and delegates storage to a
/// [`StateStore`].
pub struct StateService<S> {
    store: S,
}

impl<S> StateService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> StateService<S>
where
    S: StateStore,
{
    /// Load and deserialize a state value for `key`. Returns `Ok(None)` if
    /// `key` has never been saved.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, StateError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(StateError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a state value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), StateError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}
