//! The word list for the word-building game.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreLatency;
use crate::audio::SoundCue;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A word the child can build from letter tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    #[serde(rename = "Id")]
    pub id: u32,
    pub text: String,
    pub letters: Vec<char>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub audio_url: Option<String>,
}

impl Word {
    /// The word's sound URL, derived from the text when not explicit.
    pub fn sound_url(&self) -> String {
        self.audio_url
            .clone()
            .unwrap_or_else(|| format!("sounds/words/{}.mp3", self.text.to_lowercase()))
    }
}

impl SoundCue for Word {
    fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }
}

/// Keyed in-memory word store.
pub struct WordStore {
    words: Mutex<Vec<Word>>,
    latency: StoreLatency,
}

impl WordStore {
    pub fn from_embedded() -> Result<Self, StoreError> {
        const SEED: &str = include_str!("../../config/words.json");
        let words: Vec<Word> =
            serde_json::from_str(SEED).map_err(|e| StoreError::SeedParseFailed {
                entity: "Word",
                source: e,
            })?;

        Ok(Self {
            words: Mutex::new(words),
            latency: StoreLatency::default(),
        })
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn get_all(&self) -> Vec<Word> {
        self.latency.read_delay();
        self.words.lock().clone()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Word> {
        self.latency.read_delay();
        self.words.lock().iter().find(|w| w.id == id).cloned()
    }

    pub fn get_by_difficulty(&self, difficulty: Difficulty) -> Vec<Word> {
        self.latency.read_delay();
        self.words
            .lock()
            .iter()
            .filter(|w| w.difficulty == difficulty)
            .cloned()
            .collect()
    }

    /// Check whether a sequence of letter tiles spells a known word.
    pub fn validate_word(&self, letters: &[char]) -> Option<Word> {
        self.latency.read_delay();
        let candidate: String = letters.iter().collect::<String>().to_uppercase();
        self.words
            .lock()
            .iter()
            .find(|w| w.text == candidate)
            .cloned()
    }

    /// Add a word, allocating the next free id.
    pub fn create(&self, text: &str, difficulty: Difficulty) -> Word {
        self.latency.write_delay();
        let mut words = self.words.lock();
        let id = words.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let text = text.to_uppercase();
        let word = Word {
            id,
            letters: text.chars().collect(),
            text,
            difficulty,
            audio_url: None,
        };
        words.push(word.clone());
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WordStore {
        WordStore::from_embedded()
            .unwrap()
            .with_latency(StoreLatency::none())
    }

    #[test]
    fn test_embedded_words() {
        let words = store().get_all();
        assert_eq!(words.len(), 12);
        assert!(words.iter().all(|w| w.letters.len() == 3));
    }

    #[test]
    fn test_get_by_difficulty() {
        let easy = store().get_by_difficulty(Difficulty::Easy);
        assert_eq!(easy.len(), 6);
        assert!(easy.iter().all(|w| w.difficulty == Difficulty::Easy));
    }

    #[test]
    fn test_validate_word_is_case_insensitive() {
        let store = store();
        let word = store.validate_word(&['c', 'a', 't']).unwrap();
        assert_eq!(word.text, "CAT");

        assert!(store.validate_word(&['x', 'y', 'z']).is_none());
    }

    #[test]
    fn test_create_allocates_next_id() {
        let store = store();
        let word = store.create("bus", Difficulty::Easy);

        assert_eq!(word.id, 13);
        assert_eq!(word.text, "BUS");
        assert_eq!(word.letters, vec!['B', 'U', 'S']);
        assert!(store.get_by_id(13).is_some());
    }

    #[test]
    fn test_sound_url_derived_from_text() {
        let word = store().get_by_id(1).unwrap();
        assert_eq!(word.sound_url(), "sounds/words/cat.mp3");
    }
}
