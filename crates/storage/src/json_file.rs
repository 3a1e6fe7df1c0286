//! JSON file adapters for the word bank and progress snapshots.
//!
//! A word bank file maps each group name to its entries, in display order:
//!
//! ```json
//! { "Group 1": [ { "word": "abound", "simple": "be plentiful", "meaning": "..." } ] }
//! ```

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use vocab_core::model::{GroupError, VocabEntry, VocabGroup, WordBank};

use crate::repository::{SnapshotStore, StorageError, WordBankRepository};

/// Parses a word bank document, keeping the group order of the file.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON and `StorageError::Group` for
/// invalid groups (blank names, duplicate words).
pub fn parse_word_bank(json: &str) -> Result<WordBank, StorageError> {
    let doc: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))?;

    let mut groups = Vec::with_capacity(doc.len());
    for (name, entries) in doc {
        let entries: Vec<VocabEntry> = serde_json::from_value(entries)
            .map_err(|e| StorageError::Serialization(format!("group {name}: {e}")))?;
        groups.push(VocabGroup::new(name, entries)?);
    }
    Ok(WordBank::new(groups)?)
}

/// Built-in bank used when no word bank file is configured.
///
/// # Errors
///
/// Never fails for the bundled data; the `Result` mirrors group validation.
pub fn fallback_word_bank() -> Result<WordBank, GroupError> {
    let group = VocabGroup::new(
        "Group 1",
        vec![
            VocabEntry::new("abound", "be plentiful", "প্রচুর থাকা"),
            VocabEntry::new("austere", "strict, plain, simple", "কঠোর, সাধারণ, সরল"),
            VocabEntry::new(
                "capricious",
                "impulsive, unpredictable",
                "আবেগপ্রবণ, অনিয়মিত",
            ),
        ],
    )?;
    WordBank::new(vec![group])
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError {
    let path = path.to_path_buf();
    move |source| StorageError::Io { path, source }
}

fn read(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(io_error(path))
}

/// Word bank stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonWordBankFile {
    path: PathBuf,
}

impl JsonWordBankFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordBankRepository for JsonWordBankFile {
    fn load_bank(&self) -> Result<WordBank, StorageError> {
        let bank = parse_word_bank(&read(&self.path)?)?;
        tracing::debug!(
            path = %self.path.display(),
            groups = bank.groups().len(),
            words = bank.total_words(),
            "word bank loaded"
        );
        Ok(bank)
    }
}

/// Snapshot document stored as a JSON file.
///
/// Saves write a sibling `.json.tmp` file and rename it over the target.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn load_snapshot(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot yet");
                Ok(None)
            }
            Err(e) => Err(io_error(&self.path)(e)),
        }
    }

    fn save_snapshot(&self, json: &str) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_error(dir))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_error(&self.path))?;

        tracing::info!(path = %self.path.display(), bytes = json.len(), "snapshot saved");
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
