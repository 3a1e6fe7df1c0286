use rand::Rng;
use rand::seq::{IndexedRandom, index};
use std::collections::HashSet;

use crate::model::{VocabEntry, VocabGroup};

/// Picks up to `count` wrong-answer entries for `exclude`, uniformly and without
/// replacement.
///
/// Candidates never include `exclude` itself or any entry whose meaning equals its
/// meaning, and no two picked entries share a meaning. When fewer candidates exist than
/// requested, all of them are returned in random order.
pub fn sample_distractors<'a, R: Rng>(
    group: &'a VocabGroup,
    exclude: &VocabEntry,
    count: usize,
    rng: &mut R,
) -> Vec<&'a VocabEntry> {
    let mut seen_meanings = HashSet::new();
    let candidates: Vec<&VocabEntry> = group
        .entries()
        .iter()
        .filter(|e| e.word != exclude.word && e.meaning != exclude.meaning)
        .filter(|e| seen_meanings.insert(e.meaning.as_str()))
        .collect();

    let amount = count.min(candidates.len());
    index::sample(rng, candidates.len(), amount)
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}

/// Chooses one other entry whose simple definition differs from `exclude`'s.
///
/// Returns `None` when the group has no such entry (e.g. a single-entry group).
pub fn pick_other<'a, R: Rng>(
    group: &'a VocabGroup,
    exclude: &VocabEntry,
    rng: &mut R,
) -> Option<&'a VocabEntry> {
    let candidates: Vec<&VocabEntry> = group
        .entries()
        .iter()
        .filter(|e| e.word != exclude.word && e.simple != exclude.simple)
        .collect();
    candidates.choose(rng).copied()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn group(words: &[(&str, &str, &str)]) -> VocabGroup {
        VocabGroup::new(
            "Group",
            words
                .iter()
                .map(|(w, s, m)| VocabEntry::new(*w, *s, *m))
                .collect(),
        )
        .unwrap()
    }

    fn five() -> VocabGroup {
        group(&[
            ("abound", "be plentiful", "exist in large numbers"),
            ("austere", "strict", "severe in manner"),
            ("capricious", "unpredictable", "prone to sudden change"),
            ("diatribe", "bitter attack", "forceful verbal criticism"),
            ("enervate", "weaken", "cause to feel drained"),
        ])
    }

    #[test]
    fn never_returns_the_excluded_entry_or_duplicates() {
        let g = five();
        let target = &g.entries()[0];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let picked = sample_distractors(&g, target, 3, &mut rng);
            assert_eq!(picked.len(), 3);
            assert!(picked.iter().all(|e| e.word != target.word));
            let unique: HashSet<_> = picked.iter().map(|e| e.word.as_str()).collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn small_group_returns_every_candidate() {
        let g = group(&[
            ("abound", "be plentiful", "exist in large numbers"),
            ("austere", "strict", "severe in manner"),
            ("capricious", "unpredictable", "prone to sudden change"),
        ]);
        let mut rng = StdRng::seed_from_u64(9);
        let picked = sample_distractors(&g, &g.entries()[1], 3, &mut rng);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn entries_sharing_the_meaning_are_not_distractors() {
        let g = group(&[
            ("abound", "be plentiful", "exist in large numbers"),
            ("teem", "swarm", "exist in large numbers"),
            ("austere", "strict", "severe in manner"),
            ("stern", "strict", "severe in manner"),
        ]);
        let mut rng = StdRng::seed_from_u64(11);
        let picked = sample_distractors(&g, &g.entries()[0], 3, &mut rng);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].meaning, "severe in manner");
    }

    #[test]
    fn pick_other_skips_same_definition_and_handles_singletons() {
        let single = group(&[("abound", "be plentiful", "exist in large numbers")]);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(pick_other(&single, &single.entries()[0], &mut rng).is_none());

        let g = five();
        for _ in 0..20 {
            let other = pick_other(&g, &g.entries()[2], &mut rng).unwrap();
            assert_ne!(other.simple, g.entries()[2].simple);
        }
    }
}
