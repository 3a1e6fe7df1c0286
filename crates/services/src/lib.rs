#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod flashcards;
pub mod progress_service;
pub mod sessions;
pub mod snapshot;

pub use vocab_core::Clock;

pub use engine::VocabEngine;
pub use error::EngineError;
pub use flashcards::{FlashcardCursor, FlashcardMove};
pub use progress_service::{ProgressAggregator, ProgressReport};
pub use sessions::{SessionProgress, SessionState, TestSession};
pub use snapshot::Snapshot;
