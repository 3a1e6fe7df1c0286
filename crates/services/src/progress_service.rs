use std::collections::BTreeMap;

use vocab_core::model::{GlobalStats, GroupId, GroupProgress, TestResult, WordBank};

/// Folds finished tests and flashcard views into per-group and global statistics.
///
/// Holds one `GroupProgress` per group of the word bank it was built from, the append-only
/// test history and the running totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressAggregator {
    progress: BTreeMap<GroupId, GroupProgress>,
    history: Vec<TestResult>,
    stats: GlobalStats,
}

/// Dashboard figures derived from the aggregator and the word bank.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub total_words: usize,
    pub total_groups: usize,
    pub groups_studied: usize,
    pub tests_taken: usize,
    pub cards_viewed: u64,
    /// Overall accuracy in percent; `None` before the first test.
    pub accuracy: Option<f64>,
    /// Mean of `best_score` over groups with at least one test.
    pub average_best_score: Option<f64>,
    pub total_practice_secs: u64,
}

impl ProgressAggregator {
    /// Starts with a zeroed record for every group in `bank`.
    #[must_use]
    pub fn new(bank: &WordBank) -> Self {
        Self {
            progress: bank
                .group_ids()
                .map(|id| (id.clone(), GroupProgress::default()))
                .collect(),
            history: Vec::new(),
            stats: GlobalStats::default(),
        }
    }

    #[must_use]
    pub fn progress(&self) -> &BTreeMap<GroupId, GroupProgress> {
        &self.progress
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&GroupProgress> {
        self.progress.get(id)
    }

    #[must_use]
    pub fn stats(&self) -> GlobalStats {
        self.stats
    }

    #[must_use]
    pub fn all_history(&self) -> &[TestResult] {
        &self.history
    }

    /// The most recent `limit` results, oldest first.
    #[must_use]
    pub fn history(&self, limit: usize) -> &[TestResult] {
        let start = self.history.len().saturating_sub(limit);
        &self.history[start..]
    }

    pub fn record_test_result(&mut self, result: TestResult) {
        self.progress
            .entry(result.group().clone())
            .or_default()
            .record_test(result.percentage(), result.day());
        self.stats.add(result.correct(), result.total());
        tracing::info!(
            group = %result.group(),
            score = %result.score(),
            percentage = result.percentage(),
            "test result recorded"
        );
        self.history.push(result);
    }

    pub fn record_card_view(&mut self, group: &GroupId, index: usize) {
        self.progress
            .entry(group.clone())
            .or_default()
            .record_view(index);
    }

    pub fn mark_studied(&mut self, group: &GroupId) {
        self.progress.entry(group.clone()).or_default().mark_studied();
    }

    /// Zeroes every known group and clears history and totals. Irreversible.
    pub fn reset_all(&mut self) {
        for progress in self.progress.values_mut() {
            *progress = GroupProgress::default();
        }
        self.history.clear();
        self.stats = GlobalStats::default();
        tracing::info!(groups = self.progress.len(), "progress reset");
    }

    /// Overwrites progress per key and replaces history and totals wholesale.
    pub(crate) fn restore(
        &mut self,
        progress: BTreeMap<GroupId, GroupProgress>,
        history: Vec<TestResult>,
        stats: GlobalStats,
    ) {
        self.progress.extend(progress);
        self.history = history;
        self.stats = stats;
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self, bank: &WordBank) -> ProgressReport {
        let tested: Vec<f64> = self
            .progress
            .values()
            .filter(|p| p.test_taken)
            .map(|p| p.best_score)
            .collect();
        let average_best_score =
            (!tested.is_empty()).then(|| tested.iter().sum::<f64>() / tested.len() as f64);

        ProgressReport {
            total_words: bank.total_words(),
            total_groups: bank.groups().len(),
            groups_studied: self.progress.values().filter(|p| p.studied).count(),
            tests_taken: self.history.len(),
            cards_viewed: self
                .progress
                .values()
                .map(|p| u64::from(p.cards_viewed))
                .sum(),
            accuracy: self.stats.accuracy(),
            average_best_score,
            total_practice_secs: self.history.iter().map(TestResult::time_taken_secs).sum(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vocab_core::model::{Answer, QuestionPolicy, Response, VocabEntry, VocabGroup};
    use vocab_core::time::fixed_now;

    fn bank() -> WordBank {
        let group = |name: &str, words: &[&str]| {
            VocabGroup::new(
                name,
                words
                    .iter()
                    .map(|w| VocabEntry::new(*w, format!("{w} simple"), format!("{w} meaning")))
                    .collect(),
            )
            .unwrap()
        };
        WordBank::new(vec![
            group("Group 1", &["abound", "austere", "capricious"]),
            group("Group 2", &["diatribe", "enervate"]),
        ])
        .unwrap()
    }

    fn result(group: &str, correct: usize, total: usize, secs: i64) -> TestResult {
        let answers = (0..total)
            .map(|i| Answer {
                question_index: i,
                question: format!("q{i}"),
                response: Response::given("x"),
                correct_answer: "x".into(),
                is_correct: i < correct,
            })
            .collect();
        TestResult::from_answers(
            GroupId::new(group),
            QuestionPolicy::Mixed,
            fixed_now(),
            fixed_now() + Duration::seconds(secs),
            answers,
        )
        .unwrap()
    }

    #[test]
    fn starts_with_zeroed_record_per_group() {
        let agg = ProgressAggregator::new(&bank());
        assert_eq!(agg.progress().len(), 2);
        assert!(agg.progress().values().all(|p| *p == GroupProgress::default()));
        assert!(agg.all_history().is_empty());
    }

    #[test]
    fn records_results_and_keeps_best_score() {
        let mut agg = ProgressAggregator::new(&bank());
        let g1 = GroupId::new("Group 1");

        agg.record_test_result(result("Group 1", 4, 5, 40));
        agg.record_test_result(result("Group 1", 1, 5, 20));

        let p = agg.group(&g1).unwrap();
        assert!(p.test_taken);
        assert!((p.best_score - 80.0).abs() < f64::EPSILON);
        assert_eq!(p.last_attempt, Some(fixed_now().date_naive()));
        assert_eq!(agg.stats().cumulative_correct, 5);
        assert_eq!(agg.stats().cumulative_total, 10);
        assert_eq!(agg.all_history().len(), 2);
    }

    #[test]
    fn history_limit_returns_most_recent_last() {
        let mut agg = ProgressAggregator::new(&bank());
        for correct in 0..4 {
            agg.record_test_result(result("Group 2", correct, 4, 10));
        }
        let recent = agg.history(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].correct(), 2);
        assert_eq!(recent[1].correct(), 3);
        assert_eq!(agg.history(10).len(), 4);
        assert!(agg.history(0).is_empty());
    }

    #[test]
    fn reset_zeroes_every_group_and_clears_history() {
        let mut agg = ProgressAggregator::new(&bank());
        let g2 = GroupId::new("Group 2");
        agg.mark_studied(&g2);
        agg.record_card_view(&g2, 3);
        agg.record_test_result(result("Group 2", 2, 2, 5));

        agg.reset_all();

        assert_eq!(agg.progress().len(), 2);
        assert_eq!(agg.group(&g2), Some(&GroupProgress::default()));
        assert!(agg.all_history().is_empty());
        assert_eq!(agg.stats(), GlobalStats::default());
    }

    #[test]
    fn report_summarizes_progress() {
        let bank = bank();
        let mut agg = ProgressAggregator::new(&bank);
        let g1 = GroupId::new("Group 1");
        agg.mark_studied(&g1);
        agg.mark_studied(&g1);
        agg.record_card_view(&g1, 2);
        agg.record_card_view(&GroupId::new("Group 2"), 0);
        agg.record_test_result(result("Group 1", 3, 4, 30));

        let report = agg.report(&bank);
        assert_eq!(report.total_words, 5);
        assert_eq!(report.total_groups, 2);
        assert_eq!(report.groups_studied, 1);
        assert_eq!(report.tests_taken, 1);
        assert_eq!(report.cards_viewed, 4);
        assert_eq!(report.accuracy, Some(75.0));
        assert_eq!(report.average_best_score, Some(75.0));
        assert_eq!(report.total_practice_secs, 30);
    }
}
