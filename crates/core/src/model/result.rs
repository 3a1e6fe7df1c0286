use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::model::{Answer, GroupId, QuestionPolicy};
use crate::time::elapsed_secs;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestResultError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("too many answers for a single test: {len}")]
    TooManyAnswers { len: usize },

    #[error("score {0:?} is not of the form correct/total")]
    InvalidScore(String),

    #[error("correct ({correct}) exceeds total ({total})")]
    CountMismatch { correct: u32, total: u32 },

    #[error("percentage must be within 0..=100")]
    InvalidPercentage,
}

//
// ─── TEST RESULT ───────────────────────────────────────────────────────────────
//

/// Historical record of one finished test. Append-only; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TestResultRecord", into = "TestResultRecord")]
pub struct TestResult {
    date: DateTime<Utc>,
    group: GroupId,
    correct: u32,
    total: u32,
    percentage: f64,
    question_type: String,
    time_taken_secs: u64,
    details: Vec<Answer>,
}

impl TestResult {
    /// Builds the result for a finished session.
    ///
    /// # Errors
    ///
    /// Returns `TestResultError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `TestResultError::TooManyAnswers` if the answer count cannot fit in `u32`.
    pub fn from_answers(
        group: GroupId,
        policy: QuestionPolicy,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        answers: Vec<Answer>,
    ) -> Result<Self, TestResultError> {
        if completed_at < started_at {
            return Err(TestResultError::InvalidTimeRange);
        }
        let total = u32::try_from(answers.len())
            .map_err(|_| TestResultError::TooManyAnswers { len: answers.len() })?;
        let correct = answers.iter().filter(|a| a.is_correct).count();
        // correct <= total, which already fits in u32
        let correct = u32::try_from(correct).unwrap_or(total);

        Ok(Self {
            date: completed_at,
            group,
            correct,
            total,
            percentage: percentage(correct, total),
            question_type: policy.label().to_owned(),
            time_taken_secs: elapsed_secs(started_at, completed_at),
            details: answers,
        })
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Calendar day of the attempt, used for `last_attempt`.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }

    #[must_use]
    pub fn group(&self) -> &GroupId {
        &self.group
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Raw score in `correct/total` form.
    #[must_use]
    pub fn score(&self) -> String {
        format!("{}/{}", self.correct, self.total)
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    #[must_use]
    pub fn question_type(&self) -> &str {
        &self.question_type
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u64 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn details(&self) -> &[Answer] {
        &self.details
    }

    #[must_use]
    pub fn band(&self) -> PerformanceBand {
        PerformanceBand::from_percentage(self.percentage)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(total) * 100.0
}

/// Wire shape of a test result inside exported snapshots.
///
/// Reading also accepts the older layout: `date` as `%Y-%m-%d %H:%M`, `time_taken` as
/// `"N seconds"` and answers carrying a plain `user_answer` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TestResultRecord {
    #[serde(deserialize_with = "crate::time::lenient::deserialize")]
    date: DateTime<Utc>,
    group: GroupId,
    score: String,
    percentage: f64,
    #[serde(rename = "type")]
    question_type: String,
    #[serde(deserialize_with = "whole_seconds")]
    time_taken: u64,
    details: Vec<Answer>,
}

/// `75` or `"75 seconds"`.
fn whole_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Text(String),
    }

    match Seconds::deserialize(d)? {
        Seconds::Whole(secs) => Ok(secs),
        Seconds::Text(text) => {
            let trimmed = text.trim();
            let digits = ["seconds", "second", "sec", "s"]
                .iter()
                .find_map(|unit| trimmed.strip_suffix(unit))
                .unwrap_or(trimmed);
            digits
                .trim()
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("invalid time_taken {text:?}")))
        }
    }
}

impl From<TestResult> for TestResultRecord {
    fn from(result: TestResult) -> Self {
        Self {
            score: result.score(),
            date: result.date,
            group: result.group,
            percentage: result.percentage,
            question_type: result.question_type,
            time_taken: result.time_taken_secs,
            details: result.details,
        }
    }
}

impl TryFrom<TestResultRecord> for TestResult {
    type Error = TestResultError;

    fn try_from(record: TestResultRecord) -> Result<Self, Self::Error> {
        let (correct, total) = parse_score(&record.score)?;
        if correct > total {
            return Err(TestResultError::CountMismatch { correct, total });
        }
        if !record.percentage.is_finite() || !(0.0..=100.0).contains(&record.percentage) {
            return Err(TestResultError::InvalidPercentage);
        }

        // Answers are recorded in question order.
        let mut details = record.details;
        for (index, answer) in details.iter_mut().enumerate() {
            answer.question_index = index;
        }

        Ok(Self {
            date: record.date,
            group: record.group,
            correct,
            total,
            percentage: record.percentage,
            question_type: record.question_type,
            time_taken_secs: record.time_taken,
            details,
        })
    }
}

fn parse_score(raw: &str) -> Result<(u32, u32), TestResultError> {
    let invalid = || TestResultError::InvalidScore(raw.to_owned());
    let (correct, total) = raw.split_once('/').ok_or_else(invalid)?;
    let correct = correct.trim().parse().map_err(|_| invalid())?;
    let total = total.trim().parse().map_err(|_| invalid())?;
    Ok((correct, total))
}

//
// ─── PERFORMANCE BAND ──────────────────────────────────────────────────────────
//

/// Feedback tier shown after a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBand {
    /// 90% and above.
    Outstanding,
    /// 75% up to 90%.
    Excellent,
    /// 60% up to 75%.
    GoodEffort,
    NeedsImprovement,
}

impl PerformanceBand {
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Outstanding
        } else if percentage >= 75.0 {
            Self::Excellent
        } else if percentage >= 60.0 {
            Self::GoodEffort
        } else {
            Self::NeedsImprovement
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Outstanding => "Outstanding! You've mastered this group!",
            Self::Excellent => "Excellent work! Keep it up!",
            Self::GoodEffort => "Good effort! Review the missed words.",
            Self::NeedsImprovement => "Needs improvement. Study this group again.",
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Response;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn answer(index: usize, is_correct: bool) -> Answer {
        Answer {
            question_index: index,
            question: format!("Q{index}"),
            response: if is_correct {
                Response::given("right")
            } else {
                Response::Skipped
            },
            correct_answer: "right".into(),
            is_correct,
        }
    }

    #[test]
    fn result_counts_correct_answers_and_elapsed_time() {
        let start = fixed_now();
        let end = start + Duration::seconds(75);
        let answers = vec![answer(0, true), answer(1, false), answer(2, true), answer(3, true)];

        let result = TestResult::from_answers(
            GroupId::new("Group 1"),
            QuestionPolicy::Mixed,
            start,
            end,
            answers,
        )
        .unwrap();

        assert_eq!(result.score(), "3/4");
        assert!((result.percentage() - 75.0).abs() < f64::EPSILON);
        assert_eq!(result.time_taken_secs(), 75);
        assert_eq!(result.question_type(), "Mixed Questions");
        assert_eq!(result.band(), PerformanceBand::Excellent);
    }

    #[test]
    fn result_rejects_inverted_time_range() {
        let start = fixed_now();
        let err = TestResult::from_answers(
            GroupId::new("Group 1"),
            QuestionPolicy::FillBlank,
            start,
            start - Duration::seconds(1),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, TestResultError::InvalidTimeRange);
    }

    #[test]
    fn record_uses_snapshot_field_names() {
        let result = TestResult::from_answers(
            GroupId::new("Group 1"),
            QuestionPolicy::TrueFalse,
            fixed_now(),
            fixed_now(),
            vec![answer(0, true)],
        )
        .unwrap();

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["score"], "1/1");
        assert_eq!(value["group"], "Group 1");
        assert_eq!(value["type"], "True/False");
        assert_eq!(value["time_taken"], 0);

        let back: TestResult = serde_json::from_value(value).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn record_rejects_bad_score() {
        let mut value = serde_json::to_value(
            TestResult::from_answers(
                GroupId::new("Group 1"),
                QuestionPolicy::Mixed,
                fixed_now(),
                fixed_now(),
                vec![answer(0, true)],
            )
            .unwrap(),
        )
        .unwrap();
        value["score"] = "5/2".into();
        assert!(serde_json::from_value::<TestResult>(value.clone()).is_err());
        value["score"] = "five".into();
        assert!(serde_json::from_value::<TestResult>(value).is_err());
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(PerformanceBand::from_percentage(90.0), PerformanceBand::Outstanding);
        assert_eq!(PerformanceBand::from_percentage(89.9), PerformanceBand::Excellent);
        assert_eq!(PerformanceBand::from_percentage(60.0), PerformanceBand::GoodEffort);
        assert_eq!(PerformanceBand::from_percentage(59.9), PerformanceBand::NeedsImprovement);
    }

    #[test]
    fn record_reads_older_text_layout() {
        let json = r#"{
            "date": "2023-11-14 22:13",
            "group": "Group 1",
            "score": "1/2",
            "percentage": 50.0,
            "type": "Multiple Choice",
            "time_taken": "42 seconds",
            "details": [
                {"question": "Q0", "user_answer": "right", "correct_answer": "right", "is_correct": true},
                {"question": "Q1", "user_answer": "Skipped", "correct_answer": "right", "is_correct": false}
            ]
        }"#;

        let result: TestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.date(), fixed_now() - Duration::seconds(20));
        assert_eq!(result.time_taken_secs(), 42);
        assert_eq!(result.details()[0].response, Response::given("right"));
        assert_eq!(result.details()[1].response, Response::Skipped);
        assert_eq!(result.details()[1].question_index, 1);

        let bad = json.replace("42 seconds", "a while");
        assert!(serde_json::from_str::<TestResult>(&bad).is_err());
    }
}
