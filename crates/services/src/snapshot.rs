//! Export/import document for a learner's progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use vocab_core::model::{GlobalStats, GroupId, GroupProgress, TestResult};

use crate::error::EngineError;

/// Everything needed to restore progress on another run or device.
///
/// `score` and `total_questions` are the cumulative totals of `GlobalStats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub progress: BTreeMap<GroupId, GroupProgress>,
    pub test_results: Vec<TestResult>,
    pub score: u64,
    pub total_questions: u64,
    #[serde(
        default,
        deserialize_with = "vocab_core::time::lenient::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub export_date: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Parses and validates a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedImport` if the JSON does not match the snapshot shape or
    /// fails [`Snapshot::validate`].
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| EngineError::MalformedImport(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// # Errors
    ///
    /// Returns `EngineError::Export` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(EngineError::Export)
    }

    /// Checks the cross-field rules serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedImport` naming the first violated rule.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.score > self.total_questions {
            return Err(EngineError::MalformedImport(format!(
                "score {} exceeds total_questions {}",
                self.score, self.total_questions
            )));
        }
        if let Some(id) = self.progress.keys().find(|id| id.is_empty()) {
            return Err(EngineError::MalformedImport(format!("blank group name {id:?}")));
        }
        for (id, progress) in &self.progress {
            if !(0.0..=100.0).contains(&progress.best_score) {
                return Err(EngineError::MalformedImport(format!(
                    "best_score {} for {id} is outside 0..=100",
                    progress.best_score
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> GlobalStats {
        GlobalStats {
            cumulative_correct: self.score,
            cumulative_total: self.total_questions,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
