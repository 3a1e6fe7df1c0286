use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::model::{
    FALSE_LABEL, Question, QuestionKind, QuestionPolicy, TRUE_LABEL, VocabEntry, VocabGroup,
};
use crate::quiz::sampler::{pick_other, sample_distractors};

/// Wrong options per multiple-choice question (4 options in total when the group allows).
pub const DISTRACTOR_COUNT: usize = 3;

/// Builds `min(requested, group.len())` questions from distinct, randomly sampled entries.
///
/// Under `QuestionPolicy::Mixed` every question draws its own kind.
pub fn generate<R: Rng>(
    group: &VocabGroup,
    policy: QuestionPolicy,
    requested: usize,
    rng: &mut R,
) -> Vec<Question> {
    let amount = requested.min(group.len());
    let picks = index::sample(rng, group.len(), amount);

    picks
        .into_iter()
        .map(|i| {
            let entry = &group.entries()[i];
            match policy.resolve(rng) {
                QuestionKind::MultipleChoice => multiple_choice(group, entry, rng),
                QuestionKind::FillBlank => fill_blank(entry),
                QuestionKind::TrueFalse => true_false(group, entry, rng),
            }
        })
        .collect()
}

fn multiple_choice<R: Rng>(group: &VocabGroup, entry: &VocabEntry, rng: &mut R) -> Question {
    let mut options: Vec<String> = sample_distractors(group, entry, DISTRACTOR_COUNT, rng)
        .into_iter()
        .map(|e| e.meaning.clone())
        .collect();
    options.push(entry.meaning.clone());
    options.shuffle(rng);

    Question::MultipleChoice {
        word: entry.word.clone(),
        prompt: format!("What does '{}' mean?", entry.word),
        correct: entry.meaning.clone(),
        options,
        hint: entry.simple.clone(),
    }
}

fn fill_blank(entry: &VocabEntry) -> Question {
    Question::FillBlank {
        word: entry.word.clone(),
        prompt: format!("'{}' means: _________", entry.word),
        correct: entry.simple.clone(),
        hint: entry.meaning.clone(),
    }
}

fn true_false<R: Rng>(group: &VocabGroup, entry: &VocabEntry, rng: &mut R) -> Question {
    let wants_true = rng.random_bool(0.5);
    // A false pairing needs another entry with a different definition.
    let other = if wants_true {
        None
    } else {
        pick_other(group, entry, rng)
    };

    let (definition, is_true) = match other {
        Some(other) => (other.simple.as_str(), false),
        None => (entry.simple.as_str(), true),
    };

    Question::TrueFalse {
        word: entry.word.clone(),
        statement: format!("'{}' means: {}", entry.word, definition),
        correct: if is_true { TRUE_LABEL } else { FALSE_LABEL }.to_owned(),
        is_true,
        meaning: entry.meaning.clone(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn gre_group(n: usize) -> VocabGroup {
        let words = [
            ("abound", "be plentiful", "exist in large numbers"),
            ("austere", "strict", "severe in manner"),
            ("capricious", "unpredictable", "prone to sudden change"),
            ("diatribe", "bitter attack", "forceful verbal criticism"),
            ("enervate", "weaken", "cause to feel drained"),
            ("fervid", "passionate", "intensely enthusiastic"),
        ];
        VocabGroup::new(
            "Group 1",
            words[..n]
                .iter()
                .map(|(w, s, m)| VocabEntry::new(*w, *s, *m))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn returns_min_of_requested_and_group_size_with_distinct_words() {
        let group = gre_group(6);
        let mut rng = StdRng::seed_from_u64(1);
        for requested in [1, 4, 6, 10] {
            let questions = generate(&group, QuestionPolicy::Mixed, requested, &mut rng);
            assert_eq!(questions.len(), requested.min(6));
            let words: HashSet<_> = questions.iter().map(Question::word).collect();
            assert_eq!(words.len(), questions.len());
            assert!(words.iter().all(|w| group.find(w).is_some()));
        }
    }

    #[test]
    fn multiple_choice_contains_correct_once_without_duplicates() {
        let group = gre_group(6);
        let mut rng = StdRng::seed_from_u64(2);
        for q in generate(&group, QuestionPolicy::MultipleChoice, 6, &mut rng) {
            let Question::MultipleChoice {
                options, correct, ..
            } = &q
            else {
                panic!("expected multiple choice, got {q:?}");
            };
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|o| *o == correct).count(), 1);
            let unique: HashSet<_> = options.iter().collect();
            assert_eq!(unique.len(), options.len());
        }
    }

    #[test]
    fn three_word_group_yields_three_options_per_question() {
        let group = gre_group(3);
        let mut rng = StdRng::seed_from_u64(3);
        let questions = generate(&group, QuestionPolicy::MultipleChoice, 3, &mut rng);
        assert_eq!(questions.len(), 3);
        for q in &questions {
            assert_eq!(q.options().len(), 3);
            assert!(q.prompt().starts_with("What does '"));
            assert_eq!(q.hint(), group.find(q.word()).map(|e| e.simple.as_str()));
        }
    }

    #[test]
    fn false_statements_never_use_the_own_definition() {
        let group = gre_group(4);
        let mut rng = StdRng::seed_from_u64(4);
        let mut saw_false = false;
        for _ in 0..30 {
            for q in generate(&group, QuestionPolicy::TrueFalse, 4, &mut rng) {
                let Question::TrueFalse {
                    word,
                    statement,
                    correct,
                    is_true,
                    ..
                } = &q
                else {
                    panic!("expected true/false, got {q:?}");
                };
                let own = &group.find(word).unwrap().simple;
                if *is_true {
                    assert_eq!(correct, TRUE_LABEL);
                    assert!(statement.ends_with(own.as_str()));
                } else {
                    saw_false = true;
                    assert_eq!(correct, FALSE_LABEL);
                    assert!(!statement.ends_with(own.as_str()));
                }
            }
        }
        assert!(saw_false);
    }

    #[test]
    fn single_entry_group_only_builds_true_statements() {
        let group = gre_group(1);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let questions = generate(&group, QuestionPolicy::TrueFalse, 5, &mut rng);
            assert_eq!(questions.len(), 1);
            assert_eq!(questions[0].correct_answer(), TRUE_LABEL);
        }
    }

    #[test]
    fn fill_blank_expects_simple_definition() {
        let group = gre_group(2);
        let mut rng = StdRng::seed_from_u64(6);
        for q in generate(&group, QuestionPolicy::FillBlank, 2, &mut rng) {
            let entry = group.find(q.word()).unwrap();
            assert_eq!(q.correct_answer(), entry.simple);
            assert_eq!(q.hint(), Some(entry.meaning.as_str()));
            assert_eq!(q.prompt(), format!("'{}' means: _________", entry.word));
        }
    }

    #[test]
    fn same_seed_same_quiz() {
        let group = gre_group(6);
        let a = generate(&group, QuestionPolicy::Mixed, 5, &mut StdRng::seed_from_u64(42));
        let b = generate(&group, QuestionPolicy::Mixed, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
