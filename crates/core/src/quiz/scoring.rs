use crate::model::{Answer, Question, Response};

/// Scores `response` against `question` and builds the answer record.
///
/// Does not touch session state; the caller appends the returned answer.
#[must_use]
pub fn score(question: &Question, question_index: usize, response: Response) -> Answer {
    Answer {
        question_index,
        question: question.prompt().to_owned(),
        is_correct: is_correct(question, &response),
        correct_answer: question.correct_answer().to_owned(),
        response,
    }
}

/// Correctness rule per question kind.
///
/// Option-based questions need an exact, case-sensitive match on the canonical option.
/// Fill-in-the-blank accepts any text that contains the expected definition, ignoring case.
/// A skip is never correct.
#[must_use]
pub fn is_correct(question: &Question, response: &Response) -> bool {
    let Response::Given(value) = response else {
        return false;
    };

    match question {
        Question::MultipleChoice { correct, .. } | Question::TrueFalse { correct, .. } => {
            value == correct
        }
        Question::FillBlank { correct, .. } => {
            value.to_lowercase().contains(&correct.to_lowercase())
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
