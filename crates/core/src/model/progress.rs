use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-group study record.
///
/// `best_score` and `cards_viewed` only ever move up; the mutators below are the
/// only way they change outside of a full reset or an import.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupProgress {
    pub studied: bool,
    pub test_taken: bool,
    pub best_score: f64,
    pub last_attempt: Option<NaiveDate>,
    pub cards_viewed: u32,
}

impl GroupProgress {
    /// Folds a finished test into the record.
    pub fn record_test(&mut self, percentage: f64, on: NaiveDate) {
        self.test_taken = true;
        if percentage > self.best_score {
            self.best_score = percentage;
        }
        self.last_attempt = Some(on);
    }

    /// Records that the flashcard at `index` was shown.
    pub fn record_view(&mut self, index: usize) {
        let seen = u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX);
        self.cards_viewed = self.cards_viewed.max(seen);
    }

    pub fn mark_studied(&mut self) {
        self.studied = true;
    }
}

/// Running totals across every finished test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub cumulative_correct: u64,
    pub cumulative_total: u64,
}

impl GlobalStats {
    pub fn add(&mut self, correct: u32, total: u32) {
        self.cumulative_correct = self.cumulative_correct.saturating_add(u64::from(correct));
        self.cumulative_total = self.cumulative_total.saturating_add(u64::from(total));
    }

    /// Overall accuracy in percent, or `None` before the first test.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> Option<f64> {
        if self.cumulative_total == 0 {
            return None;
        }
        Some(self.cumulative_correct as f64 / self.cumulative_total as f64 * 100.0)
    }
}
