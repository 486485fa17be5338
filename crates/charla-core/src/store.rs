//! Flat-file persistence for saved messages
//!
//! The backing file is a single JSON array, rewritten in full on every save.
//! Single-process, single-writer: no locking, no atomic rename.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::message::Message;

/// Failures at the persistence boundary, with the file path attached
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode messages for {path}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// JSON-array store for the saved subset of the conversation.
///
/// A missing file means "no history yet" and is not an error; callers decide
/// what to do with read and write failures.
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<Message>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            action: "read",
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Overwrites the file with the given messages
    pub fn save(&self, messages: &[Message]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                action: "create directory for",
                path: self.path.clone(),
                source,
            })?;
        }

        let content =
            serde_json::to_string_pretty(messages).map_err(|source| StoreError::Encode {
                path: self.path.clone(),
                source,
            })?;

        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            action: "write",
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, Role};
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MemoryStore {
        MemoryStore::new(dir.path().join("memory.json"))
    }

    #[test]
    fn missing_file_loads_as_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_reconstructs_every_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let messages = vec![
            Message::new(Role::User, "remember me", true),
            Message::new(Role::Assistant, "noted", true),
        ];
        store.save(&messages).unwrap();

        assert_eq!(store.load().unwrap(), messages);
    }

    #[test]
    fn save_rewrites_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&[Message::new(Role::User, "first", true)])
            .unwrap();
        let replacement = vec![Message::new(Role::User, "second", true)];
        store.save(&replacement).unwrap();

        assert_eq!(store.load().unwrap(), replacement);
    }

    #[test]
    fn saving_empty_slice_truncates_to_empty_array() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save(&[Message::new(Role::User, "gone soon", true)])
            .unwrap();
        store.save(&[]).unwrap();

        assert!(store.load().unwrap().is_empty());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::fs::write(store.path(), "not json at all").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new(dir.path().join("nested/dir/memory.json"));

        store
            .save(&[Message::new(Role::User, "deep", true)])
            .unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
    }
}
