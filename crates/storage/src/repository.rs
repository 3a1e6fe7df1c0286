use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use vocab_core::model::{GroupError, GroupId, VocabGroup, WordBank};

use crate::json_file::{JsonSnapshotFile, JsonWordBankFile};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("lock poisoned: {0}")]
    Poisoned(String),

    #[error(transparent)]
    Group(#[from] GroupError),
}

/// Read access to the word bank.
pub trait WordBankRepository: Send + Sync {
    /// Load every group in display order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source cannot be read or holds invalid groups.
    fn load_bank(&self) -> Result<WordBank, StorageError>;

    /// Fetch a single group by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn get_group(&self, id: &GroupId) -> Result<VocabGroup, StorageError> {
        self.load_bank()?
            .group(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("group {id}")))
    }
}

/// Persistence for exported progress documents.
///
/// Documents are opaque JSON text; parsing and validation belong to the engine.
pub trait SnapshotStore: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored document cannot be read.
    fn load_snapshot(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    fn save_snapshot(&self, json: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    bank: Arc<Mutex<WordBank>>,
    snapshot: Arc<Mutex<Option<String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding `groups`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Group` if two groups share a name.
    pub fn with_groups(groups: Vec<VocabGroup>) -> Result<Self, StorageError> {
        let repo = Self::new();
        repo.replace_bank(WordBank::new(groups)?)?;
        Ok(repo)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Poisoned` if a previous holder of the lock panicked.
    pub fn replace_bank(&self, bank: WordBank) -> Result<(), StorageError> {
        let mut guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        *guard = bank;
        Ok(())
    }
}

impl WordBankRepository for InMemoryRepository {
    fn load_bank(&self) -> Result<WordBank, StorageError> {
        let guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(guard.clone())
    }
}

impl SnapshotStore for InMemoryRepository {
    fn load_snapshot(&self) -> Result<Option<String>, StorageError> {
        let guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save_snapshot(&self, json: &str) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Poisoned(e.to_string()))?;
        *guard = Some(json.to_owned());
        Ok(())
    }
}

/// Aggregates the word bank and snapshot store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub word_bank: Arc<dyn WordBankRepository>,
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(repo: InMemoryRepository) -> Self {
        let word_bank: Arc<dyn WordBankRepository> = Arc::new(repo.clone());
        let snapshots: Arc<dyn SnapshotStore> = Arc::new(repo);
        Self {
            word_bank,
            snapshots,
        }
    }

    /// Word bank and snapshot backed by JSON files.
    #[must_use]
    pub fn json_files(word_bank: impl Into<PathBuf>, snapshot: impl Into<PathBuf>) -> Self {
        Self {
            word_bank: Arc::new(JsonWordBankFile::new(word_bank)),
            snapshots: Arc::new(JsonSnapshotFile::new(snapshot)),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
