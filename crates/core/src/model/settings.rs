use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionPolicy;

pub const MIN_QUESTION_COUNT: u32 = 5;
pub const MAX_QUESTION_COUNT: u32 = 30;
pub const QUESTION_COUNT_STEP: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("default question count must be a multiple of 5 between 5 and 30, got {0}")]
    InvalidQuestionCount(u32),
}

/// Study preferences applied when the caller does not say otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StudySettings {
    default_question_count: u32,
    default_policy: QuestionPolicy,
    show_hints: bool,
}

/// Unvalidated settings, as read from a config file or a settings form.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StudySettingsDraft {
    pub default_question_count: Option<u32>,
    pub default_policy: Option<QuestionPolicy>,
    pub show_hints: Option<bool>,
}

impl StudySettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset values from the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidQuestionCount` if the count is outside 5..=30 or not
    /// a multiple of 5.
    pub fn validate(self) -> Result<StudySettings, SettingsError> {
        let defaults = StudySettings::default();
        let count = self
            .default_question_count
            .unwrap_or(defaults.default_question_count);

        if !(MIN_QUESTION_COUNT..=MAX_QUESTION_COUNT).contains(&count)
            || count % QUESTION_COUNT_STEP != 0
        {
            return Err(SettingsError::InvalidQuestionCount(count));
        }

        Ok(StudySettings {
            default_question_count: count,
            default_policy: self.default_policy.unwrap_or(defaults.default_policy),
            show_hints: self.show_hints.unwrap_or(defaults.show_hints),
        })
    }
}

impl StudySettings {
    #[must_use]
    pub fn default_question_count(&self) -> u32 {
        self.default_question_count
    }

    #[must_use]
    pub fn default_policy(&self) -> QuestionPolicy {
        self.default_policy
    }

    #[must_use]
    pub fn show_hints(&self) -> bool {
        self.show_hints
    }
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            default_question_count: 10,
            default_policy: QuestionPolicy::Mixed,
            show_hints: true,
        }
    }
}
