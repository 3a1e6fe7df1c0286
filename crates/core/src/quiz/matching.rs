use rand::Rng;
use rand::seq::{SliceRandom, index};
use std::collections::HashMap;

use crate::model::VocabGroup;

/// Upper bound on words per match round.
pub const MATCH_ROUND_SIZE: usize = 8;

/// Word-match game: pair each word with its simple definition from a shuffled list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRound {
    pairs: Vec<(String, String)>,
    definitions: Vec<String>,
}

/// Per-word result of a match round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetail {
    pub word: String,
    pub chosen: Option<String>,
    pub correct_definition: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub correct: usize,
    pub total: usize,
    pub details: Vec<MatchDetail>,
}

impl MatchOutcome {
    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

impl MatchRound {
    /// Samples up to `MATCH_ROUND_SIZE` entries and shuffles their definitions.
    pub fn new<R: Rng>(group: &VocabGroup, rng: &mut R) -> Self {
        let amount = MATCH_ROUND_SIZE.min(group.len());
        let pairs: Vec<(String, String)> = index::sample(rng, group.len(), amount)
            .into_iter()
            .map(|i| {
                let entry = &group.entries()[i];
                (entry.word.clone(), entry.simple.clone())
            })
            .collect();

        let mut definitions: Vec<String> = pairs.iter().map(|(_, d)| d.clone()).collect();
        definitions.shuffle(rng);

        Self { pairs, definitions }
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(w, _)| w.as_str())
    }

    #[must_use]
    pub fn definitions(&self) -> &[String] {
        &self.definitions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Scores `matches` (word → chosen definition). Missing words count as wrong.
    #[must_use]
    pub fn check(&self, matches: &HashMap<String, String>) -> MatchOutcome {
        let details: Vec<MatchDetail> = self
            .pairs
            .iter()
            .map(|(word, definition)| {
                let chosen = matches.get(word).cloned();
                MatchDetail {
                    is_correct: chosen.as_deref() == Some(definition.as_str()),
                    word: word.clone(),
                    chosen,
                    correct_definition: definition.clone(),
                }
            })
            .collect();

        MatchOutcome {
            correct: details.iter().filter(|d| d.is_correct).count(),
            total: details.len(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VocabEntry;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn group(n: usize) -> VocabGroup {
        VocabGroup::new(
            "Group 1",
            (0..n)
                .map(|i| VocabEntry::new(format!("w{i}"), format!("d{i}"), format!("m{i}")))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn round_is_capped_at_eight_words() {
        let mut rng = StdRng::seed_from_u64(1);
        let round = MatchRound::new(&group(12), &mut rng);
        assert_eq!(round.len(), MATCH_ROUND_SIZE);
        assert_eq!(round.definitions().len(), MATCH_ROUND_SIZE);

        let small = MatchRound::new(&group(3), &mut rng);
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn check_scores_matches_and_counts_missing_as_wrong() {
        let mut rng = StdRng::seed_from_u64(2);
        let round = MatchRound::new(&group(4), &mut rng);
        let words: Vec<String> = round.words().map(str::to_owned).collect();

        let mut matches = HashMap::new();
        // w<i> pairs with d<i>
        matches.insert(words[0].clone(), words[0].replace('w', "d"));
        matches.insert(words[1].clone(), "wrong".to_owned());

        let outcome = round.check(&matches);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.correct, 1);
        assert!(!outcome.is_perfect());
        assert!(outcome.details.iter().any(|d| d.chosen.is_none()));
    }

    #[test]
    fn all_correct_is_perfect() {
        let mut rng = StdRng::seed_from_u64(3);
        let round = MatchRound::new(&group(5), &mut rng);
        let matches: HashMap<String, String> = round
            .words()
            .map(|w| (w.to_owned(), w.replace('w', "d")))
            .collect();
        assert!(round.check(&matches).is_perfect());
    }
}
