use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical option shown for a true statement.
pub const TRUE_LABEL: &str = "True";
/// Canonical option shown for a false statement.
pub const FALSE_LABEL: &str = "False";

const TRUE_FALSE_OPTIONS: [&str; 2] = [TRUE_LABEL, FALSE_LABEL];

//
// ─── KIND / POLICY ─────────────────────────────────────────────────────────────
//

/// Concrete type of a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    FillBlank,
    TrueFalse,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 3] = [
        QuestionKind::MultipleChoice,
        QuestionKind::FillBlank,
        QuestionKind::TrueFalse,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "Multiple Choice",
            QuestionKind::FillBlank => "Fill in the Blank",
            QuestionKind::TrueFalse => "True/False",
        }
    }
}

/// How question kinds are assigned when a quiz is generated.
///
/// `Mixed` draws each question's kind independently and uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionPolicy {
    MultipleChoice,
    FillBlank,
    TrueFalse,
    #[default]
    Mixed,
}

impl QuestionPolicy {
    /// Picks the kind for the next question.
    pub fn resolve<R: Rng>(self, rng: &mut R) -> QuestionKind {
        match self {
            QuestionPolicy::MultipleChoice => QuestionKind::MultipleChoice,
            QuestionPolicy::FillBlank => QuestionKind::FillBlank,
            QuestionPolicy::TrueFalse => QuestionKind::TrueFalse,
            QuestionPolicy::Mixed => {
                QuestionKind::ALL[rng.random_range(0..QuestionKind::ALL.len())]
            }
        }
    }

    /// Human-readable label stored with each test result.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionPolicy::MultipleChoice => QuestionKind::MultipleChoice.label(),
            QuestionPolicy::FillBlank => QuestionKind::FillBlank.label(),
            QuestionPolicy::TrueFalse => QuestionKind::TrueFalse.label(),
            QuestionPolicy::Mixed => "Mixed Questions",
        }
    }
}

impl From<QuestionKind> for QuestionPolicy {
    fn from(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::MultipleChoice => QuestionPolicy::MultipleChoice,
            QuestionKind::FillBlank => QuestionPolicy::FillBlank,
            QuestionKind::TrueFalse => QuestionPolicy::TrueFalse,
        }
    }
}

impl fmt::Display for QuestionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a policy name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown question policy: {0}")]
pub struct ParsePolicyError(String);

impl FromStr for QuestionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple-choice" | "mc" | "multiple choice" => Ok(Self::MultipleChoice),
            "fill-blank" | "fill" | "fill in the blank" => Ok(Self::FillBlank),
            "true-false" | "tf" | "true/false" => Ok(Self::TrueFalse),
            "mixed" | "mixed questions" => Ok(Self::Mixed),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A generated quiz question. Immutable once built.
///
/// Hints and the true/false `meaning` are display context only; scoring looks at
/// `correct` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        word: String,
        prompt: String,
        correct: String,
        options: Vec<String>,
        hint: String,
    },
    FillBlank {
        word: String,
        prompt: String,
        correct: String,
        hint: String,
    },
    TrueFalse {
        word: String,
        statement: String,
        correct: String,
        is_true: bool,
        meaning: String,
    },
}

impl Question {
    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Question::FillBlank { .. } => QuestionKind::FillBlank,
            Question::TrueFalse { .. } => QuestionKind::TrueFalse,
        }
    }

    #[must_use]
    pub fn word(&self) -> &str {
        match self {
            Question::MultipleChoice { word, .. }
            | Question::FillBlank { word, .. }
            | Question::TrueFalse { word, .. } => word,
        }
    }

    /// Text shown to the user; the statement for true/false questions.
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            Question::MultipleChoice { prompt, .. } | Question::FillBlank { prompt, .. } => prompt,
            Question::TrueFalse { statement, .. } => statement,
        }
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        match self {
            Question::MultipleChoice { correct, .. }
            | Question::FillBlank { correct, .. }
            | Question::TrueFalse { correct, .. } => correct,
        }
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        match self {
            Question::MultipleChoice { hint, .. } | Question::FillBlank { hint, .. } => Some(hint),
            Question::TrueFalse { .. } => None,
        }
    }

    /// Options the user picks from; empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> Vec<&str> {
        match self {
            Question::MultipleChoice { options, .. } => {
                options.iter().map(String::as_str).collect()
            }
            Question::FillBlank { .. } => Vec::new(),
            Question::TrueFalse { .. } => TRUE_FALSE_OPTIONS.to_vec(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
