//! Alphabet letters and their phonics metadata.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreLatency;
use crate::audio::SoundCue;
use crate::error::StoreError;

/// One alphabet letter with its phonics metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    #[serde(rename = "Id")]
    pub id: u32,
    pub character: char,
    pub phonics: String,
    pub example_word: String,
    pub audio_url: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Letter {
    /// The letter's sound URL: the explicit one when present, otherwise
    /// derived from the character so callers never need a lookup table.
    pub fn sound_url(&self) -> String {
        self.audio_url.clone().unwrap_or_else(|| {
            format!("sounds/letters/{}.mp3", self.character.to_ascii_lowercase())
        })
    }
}

impl SoundCue for Letter {
    fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }
}

/// Keyed in-memory letter store.
pub struct LetterStore {
    letters: Mutex<Vec<Letter>>,
    latency: StoreLatency,
}

impl LetterStore {
    /// Seed the store from the embedded alphabet.
    pub fn from_embedded() -> Result<Self, StoreError> {
        const SEED: &str = include_str!("../../config/letters.json");
        let letters: Vec<Letter> =
            serde_json::from_str(SEED).map_err(|e| StoreError::SeedParseFailed {
                entity: "Letter",
                source: e,
            })?;

        Ok(Self {
            letters: Mutex::new(letters),
            latency: StoreLatency::default(),
        })
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn get_all(&self) -> Vec<Letter> {
        self.latency.read_delay();
        self.letters.lock().clone()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Letter> {
        self.latency.read_delay();
        self.letters.lock().iter().find(|l| l.id == id).cloned()
    }

    pub fn mark_completed(&self, id: u32) -> Result<Letter, StoreError> {
        self.latency.write_delay();
        let mut letters = self.letters.lock();
        let letter = letters
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Letter",
                id,
            })?;
        letter.completed = true;
        Ok(letter.clone())
    }

    pub fn completed(&self) -> Vec<Letter> {
        self.latency.read_delay();
        self.letters
            .lock()
            .iter()
            .filter(|l| l.completed)
            .cloned()
            .collect()
    }

    pub fn set_audio_url(&self, id: u32, url: impl Into<String>) -> Result<Letter, StoreError> {
        self.latency.write_delay();
        let mut letters = self.letters.lock();
        let letter = letters
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Letter",
                id,
            })?;
        letter.audio_url = Some(url.into());
        Ok(letter.clone())
    }
}
