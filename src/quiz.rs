use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::db::Question;

/// Category id that stands for "every category" in quiz requests.
pub const ALL_CATEGORIES: i64 = 0;

/// Picks uniformly among the candidates the player has not seen yet.
pub fn next_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question> {
    let unseen: Vec<Question> = candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .collect();
    unseen.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn questions(ids: impl IntoIterator<Item = i64>) -> Vec<Question> {
        ids.into_iter()
            .map(|id| Question {
                id,
                question: format!("question {id}"),
                answer: format!("answer {id}"),
                category: 1,
                difficulty: 1,
            })
            .collect()
    }

    #[test]
    fn never_repeats_previous_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        let previous: HashSet<i64> = [1, 2, 4].into();
        for _ in 0..50 {
            let picked = next_question(questions(1..=5), &previous, &mut rng).unwrap();
            assert!(picked.id == 3 || picked.id == 5);
        }
    }

    #[test]
    fn none_when_everything_was_seen() {
        let mut rng = StdRng::seed_from_u64(7);
        let previous: HashSet<i64> = (1..=3).collect();
        assert!(next_question(questions(1..=3), &previous, &mut rng).is_none());
        assert!(next_question(vec![], &HashSet::new(), &mut rng).is_none());
    }

    #[test]
    fn every_unseen_question_can_come_up() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let picked = next_question(questions(1..=4), &HashSet::new(), &mut rng).unwrap();
            seen.insert(picked.id);
        }
        assert_eq!(seen, (1..=4).collect::<HashSet<i64>>());
    }

    #[test]
    fn unknown_previous_ids_are_ignored() {
        let mut rng = StdRng::seed_from_u64(1);
        let previous: HashSet<i64> = [100, 200].into();
        let picked = next_question(questions([9]), &previous, &mut rng).unwrap();
        assert_eq!(picked.id, 9);
    }
}
