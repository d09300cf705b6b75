//! Game round logic, kept free of any presentation concern.
//!
//! The letter-sound quiz plays a letter's sound and asks the child to pick
//! the matching letter from a small set of options; the word builder is
//! just [`crate::services::WordStore::validate_word`] plus scoring.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::services::Letter;

/// Options shown per quiz round, target included.
const ROUND_OPTIONS: usize = 4;

/// One letter-sound quiz round: a target letter and shuffled options.
#[derive(Debug, Clone)]
pub struct LetterRound {
    target: Letter,
    options: Vec<Letter>,
}

impl LetterRound {
    /// Draw a round from the letter pool. Returns `None` when the pool is
    /// too small to fill the option set.
    pub fn new(pool: &[Letter], rng: &mut impl Rng) -> Option<Self> {
        if pool.len() < ROUND_OPTIONS {
            return None;
        }

        let options: Vec<Letter> = pool
            .choose_multiple(rng, ROUND_OPTIONS)
            .cloned()
            .collect();
        let target = options[rng.gen_range(0..options.len())].clone();

        Some(Self { target, options })
    }

    pub fn target(&self) -> &Letter {
        &self.target
    }

    pub fn options(&self) -> &[Letter] {
        &self.options
    }

    /// Did the child pick the letter whose sound was played?
    pub fn check(&self, letter_id: u32) -> bool {
        self.target.id == letter_id
    }
}

/// Running score across the rounds of one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundTally {
    correct: u32,
    answered: u32,
}

impl RoundTally {
    pub fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Score in percent; an unanswered session scores zero.
    pub fn percent(&self) -> u32 {
        if self.answered == 0 {
            0
        } else {
            self.correct * 100 / self.answered
        }
    }

    /// Star rating out of five, twenty percent per star, rounded up.
    pub fn stars(&self) -> u32 {
        (self.percent() + 19) / 20
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{LetterStore, StoreLatency};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<Letter> {
        LetterStore::from_embedded()
            .unwrap()
            .with_latency(StoreLatency::none())
            .get_all()
    }

    #[test]
    fn test_round_contains_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let round = LetterRound::new(&pool(), &mut rng).unwrap();

        assert_eq!(round.options().len(), ROUND_OPTIONS);
        assert!(round.options().iter().any(|l| l.id == round.target().id));
        assert!(round.check(round.target().id));
    }

    #[test]
    fn test_round_options_are_distinct() {
        let mut rng = StdRng::seed_from_u64(11);
        let round = LetterRound::new(&pool(), &mut rng).unwrap();

        let mut ids: Vec<u32> = round.options().iter().map(|l| l.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ROUND_OPTIONS);
    }

    #[test]
    fn test_round_needs_enough_letters() {
        let mut rng = StdRng::seed_from_u64(3);
        let small = pool().into_iter().take(3).collect::<Vec<_>>();
        assert!(LetterRound::new(&small, &mut rng).is_none());
    }

    #[test]
    fn test_wrong_answer() {
        let mut rng = StdRng::seed_from_u64(5);
        let round = LetterRound::new(&pool(), &mut rng).unwrap();

        let wrong = round
            .options()
            .iter()
            .find(|l| l.id != round.target().id)
            .unwrap();
        assert!(!round.check(wrong.id));
    }

    #[test]
    fn test_tally_percent_and_stars() {
        let mut tally = RoundTally::default();
        assert_eq!(tally.percent(), 0);
        assert_eq!(tally.stars(), 0);

        tally.record(true);
        tally.record(true);
        tally.record(false);
        tally.record(true);

        assert_eq!(tally.percent(), 75);
        assert_eq!(tally.stars(), 4);

        let mut perfect = RoundTally::default();
        perfect.record(true);
        assert_eq!(perfect.percent(), 100);
        assert_eq!(perfect.stars(), 5);
    }
}
