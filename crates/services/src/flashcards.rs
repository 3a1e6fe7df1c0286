use vocab_core::model::{GroupId, VocabEntry, VocabGroup};

use crate::error::EngineError;

/// Navigation commands for flashcard study.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashcardMove {
    First,
    Previous,
    Next,
    Last,
    ToggleMeaning,
}

/// Position within a group's flashcards.
///
/// Moves go through `VocabEngine::move_flashcard` so every shown card is recorded
/// as viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardCursor {
    group_id: GroupId,
    len: usize,
    index: usize,
    show_meaning: bool,
}

impl FlashcardCursor {
    /// # Errors
    ///
    /// Returns `EngineError::EmptyGroup` if the group has no entries.
    pub fn new(group: &VocabGroup) -> Result<Self, EngineError> {
        if group.is_empty() {
            return Err(EngineError::EmptyGroup(group.id().clone()));
        }
        Ok(Self {
            group_id: group.id().clone(),
            len: group.len(),
            index: 0,
            show_meaning: false,
        })
    }

    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn show_meaning(&self) -> bool {
        self.show_meaning
    }

    /// The entry under the cursor, looked up in `group`.
    #[must_use]
    pub fn current<'a>(&self, group: &'a VocabGroup) -> Option<&'a VocabEntry> {
        group.get(self.index)
    }

    /// Applies `mv` and returns the new index. `Previous` stops at the first card and
    /// `Next` wraps around to it. Any positional move hides the meaning again.
    pub fn apply(&mut self, mv: FlashcardMove) -> usize {
        let last = self.len.saturating_sub(1);
        match mv {
            FlashcardMove::ToggleMeaning => {
                self.show_meaning = !self.show_meaning;
                return self.index;
            }
            FlashcardMove::First => self.index = 0,
            FlashcardMove::Previous => self.index = self.index.saturating_sub(1),
            FlashcardMove::Next => self.index = (self.index + 1) % self.len.max(1),
            FlashcardMove::Last => self.index = last,
        }
        self.show_meaning = false;
        self.index
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
