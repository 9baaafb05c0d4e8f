// SPDX-License-Identifier: Apache-2.0
//! Reading conversation bundles off disk: one directory per conversation,
//! holding exactly one JSON file plus any attachment files beside it.

use crate::error::ArchiveError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One message in a conversation. Fields beyond `content` are accepted but
/// not interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// The speaker role (not interpreted by placement, which pairs by
    /// position, not role).
    #[serde(default)]
    pub role: String,
    /// The message text.
    #[serde(default)]
    pub content: String,
}

/// A conversation as read from its source JSON. Fields such as
/// `create_time`, `model`, and `message_count` are present in the source
/// format but not captured here — the core does not interpret them.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationBundle {
    /// The conversation title, used as the index key.
    pub title: String,
    /// The conversation id, used to seed the walker.
    pub id: String,
    /// Attachment filenames referenced somewhere in the conversation.
    #[serde(default)]
    pub attachments: Vec<String>,
    /// The message sequence, paired two at a time (user, assistant) during
    /// placement.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl ConversationBundle {
    /// Group messages into consecutive `(user, assistant)` pairs. A
    /// trailing unmatched message pairs with an empty assistant string.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut iter = self.messages.iter();
        while let Some(user) = iter.next() {
            let assistant = iter.next().map(|m| m.content.clone()).unwrap_or_default();
            pairs.push((user.content.clone(), assistant));
        }
        pairs
    }
}

/// Read the single conversation JSON file out of bundle directory `dir`.
///
/// # Errors
///
/// Returns [`ArchiveError::MissingSource`] if `dir` contains no `*.json`
/// file.
pub fn load_bundle(dir: &Path) -> Result<ConversationBundle, ArchiveError> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    candidates.sort();
    let json_path = candidates
        .into_iter()
        .next()
        .ok_or_else(|| ArchiveError::MissingSource {
            path: dir.to_path_buf(),
        })?;
    let bytes = fs::read(json_path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// List the immediate subdirectories of `root`, sorted by name — each one
/// a conversation bundle. Scanning is non-recursive.
///
/// # Errors
///
/// Returns [`ArchiveError::MissingSource`] if `root` is not a directory.
pub fn bundle_dirs(root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    if !root.is_dir() {
        return Err(ArchiveError::MissingSource {
            path: root.to_path_buf(),
        });
    }
    let mut dirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── 1. odd message count pairs the trailing message with "" ────────

    #[test]
    fn trailing_unmatched_message_pairs_with_empty_assistant() {
        let bundle = ConversationBundle {
            title: "t".to_string(),
            id: "i".to_string(),
            attachments: vec![],
            messages: vec![
                Message {
                    role: "user".to_string(),
                    content: "hi".to_string(),
                },
                Message {
                    role: "assistant".to_string(),
                    content: "hello".to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: "you there?".to_string(),
                },
            ],
        };
        assert_eq!(
            bundle.pairs(),
            vec![
                ("hi".to_string(), "hello".to_string()),
                ("you there?".to_string(), String::new()),
            ]
        );
    }

    // ── 2. loading a bundle with no JSON file fails with MissingSource ──

    #[test]
    fn load_bundle_without_json_is_missing_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_bundle(dir.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingSource { .. }));
    }

    // ── 3. bundle_dirs lists only directories, sorted by name ───────────

    #[test]
    fn bundle_dirs_lists_only_directories_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir(dir.path().join("b-convo")).expect("mkdir");
        fs::create_dir(dir.path().join("a-convo")).expect("mkdir");
        fs::write(dir.path().join("stray.txt"), b"not a dir").expect("write");
        let dirs = bundle_dirs(dir.path()).expect("list");
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a-convo", "b-convo"]);
    }
}
