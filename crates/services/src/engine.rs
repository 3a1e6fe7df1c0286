use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

use vocab_core::model::{
    Answer, GlobalStats, GroupId, GroupProgress, Question, QuestionPolicy, StudySettings,
    StudySettingsDraft, TestResult, VocabEntry, VocabGroup, WordBank,
};
use vocab_core::quiz::MatchRound;

use crate::Clock;
use crate::error::EngineError;
use crate::flashcards::{FlashcardCursor, FlashcardMove};
use crate::progress_service::{ProgressAggregator, ProgressReport};
use crate::sessions::{SessionState, TestSession};
use crate::snapshot::Snapshot;

/// Single-user facade over the word bank, the active test and the progress record.
///
/// Owns every piece of mutable state; callers hold it by value and drive it through
/// `&mut self`.
pub struct VocabEngine {
    bank: WordBank,
    settings: StudySettings,
    clock: Clock,
    rng: StdRng,
    progress: ProgressAggregator,
    session: Option<TestSession>,
}

impl VocabEngine {
    /// Engine over `bank` with the system clock and an OS-seeded RNG.
    #[must_use]
    pub fn new(bank: WordBank) -> Self {
        Self {
            progress: ProgressAggregator::new(&bank),
            bank,
            settings: StudySettings::default(),
            clock: Clock::default(),
            rng: StdRng::from_os_rng(),
            session: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Makes quiz generation reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: StudySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    #[must_use]
    pub fn word_bank(&self) -> &WordBank {
        &self.bank
    }

    #[must_use]
    pub fn settings(&self) -> StudySettings {
        self.settings
    }

    /// # Errors
    ///
    /// Returns `EngineError::Settings` if the draft fails validation; the current settings
    /// are kept.
    pub fn update_settings(
        &mut self,
        draft: StudySettingsDraft,
    ) -> Result<StudySettings, EngineError> {
        self.settings = draft.validate()?;
        Ok(self.settings)
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` if the bank has no such group.
    pub fn group(&self, id: &GroupId) -> Result<&VocabGroup, EngineError> {
        lookup(&self.bank, id)
    }

    //
    // ─── TEST SESSION ──────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::NotStarted, TestSession::state)
    }

    /// The active session, or the last completed one until a new test starts.
    #[must_use]
    pub fn current_session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    /// Starts a test over `group_id` and returns its questions.
    ///
    /// A completed session is replaced. An in-progress one must be abandoned first.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup`, `EngineError::EmptyGroup`,
    /// `EngineError::InvalidQuestionCount`, or `EngineError::InvalidSessionState` while
    /// another test is in progress.
    pub fn generate_quiz(
        &mut self,
        group_id: &GroupId,
        policy: QuestionPolicy,
        count: usize,
    ) -> Result<&[Question], EngineError> {
        let group = lookup(&self.bank, group_id)?;
        if self.session_state() == SessionState::InProgress {
            tracing::warn!(group = %group_id, "quiz requested while a test is in progress");
            return Err(EngineError::session(
                "start a test",
                "another test is in progress",
            ));
        }

        let session = TestSession::start(group, policy, count, self.clock.now(), &mut self.rng)?;
        tracing::info!(
            group = %group_id,
            policy = %policy,
            questions = session.questions().len(),
            "test started"
        );
        Ok(self.session.insert(session).questions())
    }

    /// [`VocabEngine::generate_quiz`] with the count and policy from the study settings.
    ///
    /// # Errors
    ///
    /// Same as [`VocabEngine::generate_quiz`].
    pub fn generate_default_quiz(&mut self, group_id: &GroupId) -> Result<&[Question], EngineError> {
        let policy = self.settings.default_policy();
        let count = usize::try_from(self.settings.default_question_count())
            .map_err(|_| EngineError::InvalidQuestionCount)?;
        self.generate_quiz(group_id, policy, count)
    }

    /// Scores `value` against the current question.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSessionState` without an in-progress test or once every
    /// question has an answer.
    pub fn submit_answer(&mut self, value: impl Into<String>) -> Result<Answer, EngineError> {
        let session = self.active_session("submit an answer")?;
        Ok(session.submit(value)?.clone())
    }

    /// # Errors
    ///
    /// Same as [`VocabEngine::submit_answer`].
    pub fn skip_answer(&mut self) -> Result<Answer, EngineError> {
        let session = self.active_session("skip a question")?;
        Ok(session.skip()?.clone())
    }

    /// Completes the test and folds its result into progress. Happens at most once per test.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSessionState` without a test, with questions still
    /// unanswered, or when the test was already finalized. Nothing is recorded then.
    pub fn finalize_session(&mut self) -> Result<TestResult, EngineError> {
        let now = self.clock.now();
        let Some(session) = self.session.as_mut() else {
            tracing::warn!("finalize requested without a test");
            return Err(EngineError::session("finalize", "no test in progress"));
        };

        let result = session.finalize(now).inspect_err(|err| {
            tracing::warn!(error = %err, "finalize rejected");
        })?;
        tracing::info!(
            group = %result.group(),
            score = %result.score(),
            band = ?result.band(),
            time_taken_secs = result.time_taken_secs(),
            "test finalized"
        );
        self.progress.record_test_result(result.clone());
        Ok(result)
    }

    /// Discards the in-progress test without scoring it.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidSessionState` when no test is in progress.
    pub fn abandon_session(&mut self) -> Result<(), EngineError> {
        if self.session_state() != SessionState::InProgress {
            tracing::warn!("abandon requested without a test in progress");
            return Err(EngineError::session("abandon", "no test in progress"));
        }
        if let Some(session) = self.session.take() {
            tracing::info!(
                group = %session.group_id(),
                answered = session.answers().len(),
                "test abandoned"
            );
        }
        Ok(())
    }

    fn active_session(&mut self, operation: &'static str) -> Result<&mut TestSession, EngineError> {
        match self.session.as_mut() {
            Some(session) if session.state() == SessionState::InProgress => Ok(session),
            _ => {
                tracing::warn!(operation, "no test in progress");
                Err(EngineError::session(operation, "no test in progress"))
            }
        }
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` if the bank has no such group.
    pub fn record_card_view(&mut self, group_id: &GroupId, index: usize) -> Result<(), EngineError> {
        lookup(&self.bank, group_id)?;
        self.progress.record_card_view(group_id, index);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` if the bank has no such group.
    pub fn mark_group_studied(&mut self, group_id: &GroupId) -> Result<(), EngineError> {
        lookup(&self.bank, group_id)?;
        self.progress.mark_studied(group_id);
        Ok(())
    }

    #[must_use]
    pub fn get_progress_snapshot(&self) -> BTreeMap<GroupId, GroupProgress> {
        self.progress.progress().clone()
    }

    /// The most recent `limit` results, most recent last.
    #[must_use]
    pub fn get_history(&self, limit: usize) -> &[TestResult] {
        self.progress.history(limit)
    }

    #[must_use]
    pub fn global_stats(&self) -> GlobalStats {
        self.progress.stats()
    }

    #[must_use]
    pub fn progress_report(&self) -> ProgressReport {
        self.progress.report(&self.bank)
    }

    /// Zeroes every group and clears history and totals. Also drops any test session.
    pub fn reset_all(&mut self) {
        self.session = None;
        self.progress.reset_all();
    }

    //
    // ─── SNAPSHOT ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn export_state(&self) -> Snapshot {
        let stats = self.progress.stats();
        let snapshot = Snapshot {
            progress: self.progress.progress().clone(),
            test_results: self.progress.all_history().to_vec(),
            score: stats.cumulative_correct,
            total_questions: stats.cumulative_total,
            export_date: Some(self.clock.now()),
        };
        tracing::info!(
            groups = snapshot.progress.len(),
            results = snapshot.test_results.len(),
            "progress exported"
        );
        snapshot
    }

    /// # Errors
    ///
    /// Returns `EngineError::Export` if serialization fails.
    pub fn export_json(&self) -> Result<String, EngineError> {
        self.export_state().to_json_pretty()
    }

    /// Merges progress per group and replaces history and totals.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedImport` if the snapshot fails validation. State is
    /// untouched in that case.
    pub fn import_state(&mut self, snapshot: Snapshot) -> Result<(), EngineError> {
        snapshot.validate().inspect_err(|err| {
            tracing::warn!(error = %err, "import rejected");
        })?;
        let stats = snapshot.stats();
        tracing::info!(
            groups = snapshot.progress.len(),
            results = snapshot.test_results.len(),
            "progress imported"
        );
        self.progress
            .restore(snapshot.progress, snapshot.test_results, stats);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `EngineError::MalformedImport` if `json` is not a valid snapshot.
    pub fn import_json(&mut self, json: &str) -> Result<(), EngineError> {
        let snapshot = Snapshot::from_json(json).inspect_err(|err| {
            tracing::warn!(error = %err, "import rejected");
        })?;
        self.import_state(snapshot)
    }

    //
    // ─── STUDY MODES ───────────────────────────────────────────────────────────
    //

    /// Opens flashcards on the first card and records it as viewed.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` or `EngineError::EmptyGroup`.
    pub fn open_flashcards(&mut self, group_id: &GroupId) -> Result<FlashcardCursor, EngineError> {
        let cursor = FlashcardCursor::new(lookup(&self.bank, group_id)?)?;
        self.progress.record_card_view(group_id, cursor.index());
        Ok(cursor)
    }

    /// Moves `cursor` and returns the card now shown. Every move counts as a view.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` if the cursor's group is not in the bank.
    pub fn move_flashcard(
        &mut self,
        cursor: &mut FlashcardCursor,
        mv: FlashcardMove,
    ) -> Result<&VocabEntry, EngineError> {
        let group = lookup(&self.bank, cursor.group_id())?;
        let index = cursor.apply(mv);
        self.progress.record_card_view(group.id(), index);
        cursor
            .current(group)
            .ok_or_else(|| EngineError::EmptyGroup(group.id().clone()))
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` or `EngineError::EmptyGroup`.
    pub fn start_match_round(&mut self, group_id: &GroupId) -> Result<MatchRound, EngineError> {
        let group = lookup(&self.bank, group_id)?;
        if group.is_empty() {
            return Err(EngineError::EmptyGroup(group_id.clone()));
        }
        Ok(MatchRound::new(group, &mut self.rng))
    }

    /// # Errors
    ///
    /// Returns `EngineError::UnknownGroup` if the bank has no such group.
    pub fn search_group(&self, group_id: &GroupId, term: &str) -> Result<Vec<&VocabEntry>, EngineError> {
        Ok(lookup(&self.bank, group_id)?.search(term))
    }
}

fn lookup<'a>(bank: &'a WordBank, id: &GroupId) -> Result<&'a VocabGroup, EngineError> {
    bank.group(id)
        .ok_or_else(|| EngineError::UnknownGroup(id.clone()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
