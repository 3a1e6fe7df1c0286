use chrono::{DateTime, Utc};
use rand::Rng;
use std::fmt;

use vocab_core::model::{
    Answer, GroupId, Question, QuestionPolicy, Response, TestResult, VocabGroup,
};
use vocab_core::quiz;

use super::progress::{SessionProgress, SessionState};
use crate::error::EngineError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt over a group.
///
/// Holds the generated questions and steps through them with a cursor, appending one
/// scored answer per question. Once every question is answered the session can be
/// finalized exactly once into a `TestResult`.
pub struct TestSession {
    group_id: GroupId,
    policy: QuestionPolicy,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    cursor: usize,
    started_at: DateTime<Utc>,
    finalized_at: Option<DateTime<Utc>>,
}

impl TestSession {
    /// Generate questions for `group` and start a fresh attempt.
    ///
    /// `started_at` should come from the engine clock to keep timing deterministic.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidQuestionCount` if `count` is zero.
    /// Returns `EngineError::EmptyGroup` if the group has no entries.
    pub fn start<R: Rng>(
        group: &VocabGroup,
        policy: QuestionPolicy,
        count: usize,
        started_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        if count == 0 {
            return Err(EngineError::InvalidQuestionCount);
        }
        if group.is_empty() {
            return Err(EngineError::EmptyGroup(group.id().clone()));
        }

        Ok(Self {
            group_id: group.id().clone(),
            policy,
            questions: quiz::generate(group, policy, count, rng),
            answers: Vec::new(),
            cursor: 0,
            started_at,
            finalized_at: None,
        })
    }

    #[must_use]
    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    #[must_use]
    pub fn policy(&self) -> QuestionPolicy {
        self.policy
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finalized_at(&self) -> Option<DateTime<Utc>> {
        self.finalized_at
    }

    /// The question awaiting an answer, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.cursor)
    }

    /// True once every question has an answer.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.questions.len()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.finalized_at.is_some() {
            SessionState::Completed
        } else {
            SessionState::InProgress
        }
    }

    /// Returns a summary of the current progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.questions.len(),
            answered: self.answers.len(),
            correct: self.answers.iter().filter(|a| a.is_correct).count(),
            remaining: self.questions.len().saturating_sub(self.cursor),
            is_complete: self.is_complete(),
        }
    }

    /// Score `value` against the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSessionState` if the session is finalized or every
    /// question is already answered.
    pub fn submit(&mut self, value: impl Into<String>) -> Result<&Answer, EngineError> {
        self.record("submit an answer", Response::Given(value.into()))
    }

    /// Record an explicit skip for the current question and advance.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TestSession::submit`].
    pub fn skip(&mut self) -> Result<&Answer, EngineError> {
        self.record("skip a question", Response::Skipped)
    }

    fn record(
        &mut self,
        operation: &'static str,
        response: Response,
    ) -> Result<&Answer, EngineError> {
        if self.finalized_at.is_some() {
            return Err(EngineError::session(operation, "test already finalized"));
        }
        let Some(question) = self.questions.get(self.cursor) else {
            return Err(EngineError::session(operation, "every question has been answered"));
        };

        let answer = quiz::score(question, self.cursor, response);
        tracing::debug!(
            group = %self.group_id,
            index = self.cursor,
            correct = answer.is_correct,
            skipped = answer.response.is_skipped(),
            "answer recorded"
        );
        self.answers.push(answer);
        self.cursor += 1;

        self.answers
            .last()
            .ok_or(EngineError::session(operation, "answer was not recorded"))
    }

    /// Close the attempt and build its result. One-shot: a second call fails.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSessionState` if questions remain or the session was
    /// already finalized.
    pub(crate) fn finalize(&mut self, completed_at: DateTime<Utc>) -> Result<TestResult, EngineError> {
        if self.finalized_at.is_some() {
            return Err(EngineError::session("finalize", "test already finalized"));
        }
        if !self.is_complete() {
            return Err(EngineError::session("finalize", "questions remain unanswered"));
        }

        // A wall clock that stepped backwards yields a zero-length attempt.
        let completed_at = completed_at.max(self.started_at);
        let result = TestResult::from_answers(
            self.group_id.clone(),
            self.policy,
            self.started_at,
            completed_at,
            self.answers.clone(),
        )?;
        self.finalized_at = Some(completed_at);
        Ok(result)
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("group_id", &self.group_id)
            .field("policy", &self.policy)
            .field("questions_len", &self.questions.len())
            .field("cursor", &self.cursor)
            .field("answers_len", &self.answers.len())
            .field("started_at", &self.started_at)
            .field("finalized_at", &self.finalized_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vocab_core::model::VocabEntry;
    use vocab_core::time::fixed_now;

    fn build_group(n: usize) -> VocabGroup {
        VocabGroup::new(
            "Group 1",
            (0..n)
                .map(|i| VocabEntry::new(format!("word{i}"), format!("simple{i}"), format!("meaning{i}")))
                .collect(),
        )
        .unwrap()
    }

    fn start(n: usize, count: usize) -> TestSession {
        let mut rng = StdRng::seed_from_u64(1);
        TestSession::start(&build_group(n), QuestionPolicy::FillBlank, count, fixed_now(), &mut rng)
            .unwrap()
    }

    #[test]
    fn empty_group_returns_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = TestSession::start(&build_group(0), QuestionPolicy::Mixed, 5, fixed_now(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyGroup(_)));
    }

    #[test]
    fn zero_count_returns_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = TestSession::start(&build_group(3), QuestionPolicy::Mixed, 0, fixed_now(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuestionCount));
    }

    #[test]
    fn session_advances_and_completes() {
        let mut session = start(3, 2);
        assert_eq!(session.questions().len(), 2);
        assert!(!session.is_complete());

        let expected = session.current_question().unwrap().correct_answer().to_owned();
        let first = session.submit(expected).unwrap();
        assert!(first.is_correct);
        assert_eq!(first.question_index, 0);

        let skipped = session.skip().unwrap();
        assert!(!skipped.is_correct);
        assert_eq!(skipped.response, Response::Skipped);

        assert!(session.is_complete());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(
            session.progress(),
            SessionProgress {
                total: 2,
                answered: 2,
                correct: 1,
                remaining: 0,
                is_complete: true,
            }
        );

        let err = session.submit("late").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSessionState { .. }));
    }

    #[test]
    fn finalize_requires_all_answers_and_is_one_shot() {
        let mut session = start(2, 2);
        let err = session.finalize(fixed_now()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSessionState { .. }));

        session.skip().unwrap();
        session.skip().unwrap();

        let done = fixed_now() + Duration::seconds(30);
        let result = session.finalize(done).unwrap();
        assert_eq!(result.score(), "0/2");
        assert_eq!(result.time_taken_secs(), 30);
        assert_eq!(session.state(), SessionState::Completed);

        let err = session.finalize(done).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSessionState { .. }));
        let err = session.skip().unwrap_err();
        assert!(matches!(err, EngineError::InvalidSessionState { .. }));
    }
}
