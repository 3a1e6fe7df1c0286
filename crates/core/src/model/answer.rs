use serde::{Deserialize, Serialize};

/// What the user did with a question.
///
/// Skipping is recorded explicitly so history can tell "declined" apart from
/// "attempted and wrong", including an attempt with an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "ResponseRecord")]
pub enum Response {
    Given(String),
    Skipped,
}

/// Accepts the tagged form as well as a bare string, where `"Skipped"` marks a skip.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseRecord {
    Tagged(TaggedResponse),
    Plain(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedResponse {
    Given(String),
    Skipped,
}

impl From<ResponseRecord> for Response {
    fn from(record: ResponseRecord) -> Self {
        match record {
            ResponseRecord::Tagged(TaggedResponse::Given(value)) => Response::Given(value),
            ResponseRecord::Tagged(TaggedResponse::Skipped) => Response::Skipped,
            ResponseRecord::Plain(value) if value == "Skipped" => Response::Skipped,
            ResponseRecord::Plain(value) => Response::Given(value),
        }
    }
}

impl Response {
    #[must_use]
    pub fn given(value: impl Into<String>) -> Self {
        Self::Given(value.into())
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Response::Skipped)
    }

    /// Text suitable for a results table.
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Response::Given(value) => value,
            Response::Skipped => "Skipped",
        }
    }
}

/// Scored outcome of a single question. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub question_index: usize,
    pub question: String,
    #[serde(alias = "user_answer")]
    pub response: Response,
    pub correct_answer: String,
    pub is_correct: bool,
}
