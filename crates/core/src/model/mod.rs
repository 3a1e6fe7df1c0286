mod answer;
mod group;
mod ids;
mod progress;
mod question;
mod result;
mod settings;

pub use ids::{GroupId, ParseIdError};

pub use answer::{Answer, Response};
pub use group::{GroupError, VocabEntry, VocabGroup, WordBank};
pub use progress::{GlobalStats, GroupProgress};
pub use question::{
    FALSE_LABEL, ParsePolicyError, Question, QuestionKind, QuestionPolicy, TRUE_LABEL,
};
pub use result::{PerformanceBand, TestResult, TestResultError};
pub use settings::{
    MAX_QUESTION_COUNT, MIN_QUESTION_COUNT, SettingsError, StudySettings, StudySettingsDraft,
};
