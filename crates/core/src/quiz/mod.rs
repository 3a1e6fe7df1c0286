//! Quiz algorithms: distractor sampling, question generation, answer scoring and the
//! word-match round. Everything here is pure apart from the injected random source.

mod generator;
mod matching;
mod sampler;
mod scoring;

pub use generator::{DISTRACTOR_COUNT, generate};
pub use matching::{MATCH_ROUND_SIZE, MatchDetail, MatchOutcome, MatchRound};
pub use sampler::{pick_other, sample_distractors};
pub use scoring::{is_correct, score};
