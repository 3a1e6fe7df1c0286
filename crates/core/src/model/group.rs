use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::GroupId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GroupError {
    #[error("group name cannot be empty")]
    EmptyName,

    #[error("word cannot be empty in group {group}")]
    EmptyWord { group: GroupId },

    #[error("duplicate word {word:?} in group {group}")]
    DuplicateWord { group: GroupId, word: String },

    #[error("duplicate group {0}")]
    DuplicateGroup(GroupId),
}

//
// ─── ENTRY ─────────────────────────────────────────────────────────────────────
//

/// A single vocabulary item: the word, a short definition and a longer meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    pub simple: String,
    pub meaning: String,
}

impl VocabEntry {
    #[must_use]
    pub fn new(
        word: impl Into<String>,
        simple: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            simple: simple.into(),
            meaning: meaning.into(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.word.to_lowercase().contains(needle)
            || self.simple.to_lowercase().contains(needle)
            || self.meaning.to_lowercase().contains(needle)
    }
}

//
// ─── GROUP ─────────────────────────────────────────────────────────────────────
//

/// Named, ordered collection of entries studied and tested together.
///
/// Words are unique within a group. A group may be empty at construction time;
/// quizzing an empty group is rejected by the engine instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabGroup {
    id: GroupId,
    entries: Vec<VocabEntry>,
}

impl VocabGroup {
    /// Creates a group after checking the name and word uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `GroupError::EmptyName` for a blank name, `GroupError::EmptyWord` for a blank
    /// word and `GroupError::DuplicateWord` when the same word appears twice.
    pub fn new(id: impl Into<GroupId>, entries: Vec<VocabEntry>) -> Result<Self, GroupError> {
        let id = id.into();
        if id.is_empty() {
            return Err(GroupError::EmptyName);
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.word.trim().is_empty() {
                return Err(GroupError::EmptyWord { group: id });
            }
            if !seen.insert(entry.word.as_str()) {
                return Err(GroupError::DuplicateWord {
                    group: id.clone(),
                    word: entry.word.clone(),
                });
            }
        }

        Ok(Self { id, entries })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    #[must_use]
    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&VocabEntry> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn find(&self, word: &str) -> Option<&VocabEntry> {
        self.entries.iter().find(|e| e.word == word)
    }

    /// Case-insensitive search over word, simple definition and meaning.
    ///
    /// A blank term returns every entry in group order.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&VocabEntry> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries.iter().filter(|e| e.matches(&needle)).collect()
    }
}

//
// ─── WORD BANK ─────────────────────────────────────────────────────────────────
//

/// Immutable catalog of every group, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordBank {
    groups: Vec<VocabGroup>,
}

impl WordBank {
    /// # Errors
    ///
    /// Returns `GroupError::DuplicateGroup` if two groups share an id.
    pub fn new(groups: Vec<VocabGroup>) -> Result<Self, GroupError> {
        let mut seen = HashSet::with_capacity(groups.len());
        for group in &groups {
            if !seen.insert(group.id()) {
                return Err(GroupError::DuplicateGroup(group.id().clone()));
            }
        }
        Ok(Self { groups })
    }

    #[must_use]
    pub fn groups(&self) -> &[VocabGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&VocabGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.iter().map(VocabGroup::id)
    }

    #[must_use]
    pub fn total_words(&self) -> usize {
        self.groups.iter().map(VocabGroup::len).sum()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
