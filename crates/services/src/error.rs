//! Shared error types for the services crate.

use thiserror::Error;

use vocab_core::model::{GroupId, SettingsError, TestResultError};

/// Errors emitted by `VocabEngine` and the session state machine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    #[error("group {0} has no entries")]
    EmptyGroup(GroupId),
    #[error("unknown group {0}")]
    UnknownGroup(GroupId),
    #[error("question count must be at least 1")]
    InvalidQuestionCount,
    #[error("cannot {operation}: {reason}")]
    InvalidSessionState {
        operation: &'static str,
        reason: &'static str,
    },
    #[error("malformed import: {0}")]
    MalformedImport(String),
    #[error("export failed: {0}")]
    Export(#[source] serde_json::Error),
    #[error(transparent)]
    Result(#[from] TestResultError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl EngineError {
    pub(crate) fn session(operation: &'static str, reason: &'static str) -> Self {
        Self::InvalidSessionState { operation, reason }
    }
}
