//! The child's overall learning progress.
//!
//! Single-record semantics: there is one progress row per running app,
//! created on first write if the seed was empty.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreLatency;
use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    #[serde(rename = "Id")]
    pub id: u32,
    pub completed_letters: Vec<u32>,
    pub completed_words: Vec<u32>,
    pub total_stars: u32,
    pub current_level: u32,
    pub streak_days: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            id: 1,
            completed_letters: Vec::new(),
            completed_words: Vec::new(),
            total_stars: 0,
            current_level: 1,
            streak_days: 0,
        }
    }
}

/// Single-record progress store.
pub struct ProgressStore {
    record: Mutex<Option<Progress>>,
    latency: StoreLatency,
}

impl ProgressStore {
    pub fn from_embedded() -> Result<Self, StoreError> {
        const SEED: &str = include_str!("../../config/progress.json");
        let records: Vec<Progress> =
            serde_json::from_str(SEED).map_err(|e| StoreError::SeedParseFailed {
                entity: "Progress",
                source: e,
            })?;

        Ok(Self {
            record: Mutex::new(records.into_iter().next()),
            latency: StoreLatency::default(),
        })
    }

    /// An empty store, as if the seed held no record yet.
    pub fn empty() -> Self {
        Self {
            record: Mutex::new(None),
            latency: StoreLatency::default(),
        }
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn get(&self) -> Option<Progress> {
        self.latency.read_delay();
        self.record.lock().clone()
    }

    /// Apply an arbitrary mutation to the record, creating it first if
    /// none exists.
    pub fn update(&self, apply: impl FnOnce(&mut Progress)) -> Progress {
        self.latency.write_delay();
        let mut record = self.record.lock();
        let progress = record.get_or_insert_with(Progress::default);
        apply(progress);
        progress.clone()
    }

    /// Record a completed letter. Idempotent per letter; each new letter
    /// is worth one star.
    pub fn add_completed_letter(&self, letter_id: u32) -> Progress {
        self.update(|p| {
            if !p.completed_letters.contains(&letter_id) {
                p.completed_letters.push(letter_id);
                p.total_stars += 1;
            }
        })
    }

    /// Record a completed word. Idempotent per word; each new word is
    /// worth three stars.
    pub fn add_completed_word(&self, word_id: u32) -> Progress {
        self.update(|p| {
            if !p.completed_words.contains(&word_id) {
                p.completed_words.push(word_id);
                p.total_stars += 3;
            }
        })
    }

    pub fn award_stars(&self, count: u32) -> Progress {
        self.update(|p| p.total_stars += count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ProgressStore {
        ProgressStore::from_embedded()
            .unwrap()
            .with_latency(StoreLatency::none())
    }

    #[test]
    fn test_seeded_record() {
        let progress = store().get().unwrap();
        assert_eq!(progress.completed_letters, vec![1, 2, 3]);
        assert_eq!(progress.total_stars, 6);
    }

    #[test]
    fn test_add_completed_letter_is_idempotent() {
        let store = store();
        let before = store.get().unwrap().total_stars;

        let progress = store.add_completed_letter(4);
        assert_eq!(progress.total_stars, before + 1);

        // Same letter again: no extra star
        let progress = store.add_completed_letter(4);
        assert_eq!(progress.total_stars, before + 1);
    }

    #[test]
    fn test_add_completed_word_awards_three_stars() {
        let store = store();
        let before = store.get().unwrap().total_stars;

        let progress = store.add_completed_word(2);
        assert_eq!(progress.total_stars, before + 3);
        assert!(progress.completed_words.contains(&2));
    }

    #[test]
    fn test_empty_store_creates_record_on_write() {
        let store = ProgressStore::empty().with_latency(StoreLatency::none());
        assert!(store.get().is_none());

        let progress = store.award_stars(2);
        assert_eq!(progress.id, 1);
        assert_eq!(progress.total_stars, 2);
        assert_eq!(progress.current_level, 1);
    }
}
