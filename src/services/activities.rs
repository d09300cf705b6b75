//! Recently played game activities.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::StoreLatency;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    #[serde(rename = "letter-sound")]
    LetterSound,
    #[serde(rename = "word-building")]
    WordBuilding,
}

/// One finished game round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "Id")]
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Round score in percent
    pub score: u32,
    /// Completion time, milliseconds since the epoch
    pub completed_at: u64,
}

/// Keyed in-memory activity log.
pub struct ActivityStore {
    activities: Mutex<Vec<Activity>>,
    latency: StoreLatency,
}

impl ActivityStore {
    pub fn from_embedded() -> Result<Self, StoreError> {
        const SEED: &str = include_str!("../../config/activities.json");
        let activities: Vec<Activity> =
            serde_json::from_str(SEED).map_err(|e| StoreError::SeedParseFailed {
                entity: "Activity",
                source: e,
            })?;

        Ok(Self {
            activities: Mutex::new(activities),
            latency: StoreLatency::default(),
        })
    }

    pub fn with_latency(mut self, latency: StoreLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn get_all(&self) -> Vec<Activity> {
        self.latency.read_delay();
        self.activities.lock().clone()
    }

    pub fn get_by_id(&self, id: u32) -> Option<Activity> {
        self.latency.read_delay();
        self.activities.lock().iter().find(|a| a.id == id).cloned()
    }

    pub fn get_by_kind(&self, kind: ActivityKind) -> Vec<Activity> {
        self.latency.read_delay();
        self.activities
            .lock()
            .iter()
            .filter(|a| a.kind == kind)
            .cloned()
            .collect()
    }

    /// Log a finished round, stamping the completion time.
    pub fn create(&self, kind: ActivityKind, score: u32) -> Activity {
        self.latency.write_delay();
        let completed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let mut activities = self.activities.lock();
        let id = activities.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let activity = Activity {
            id,
            kind,
            score: score.min(100),
            completed_at,
        };
        activities.push(activity.clone());
        activity
    }

    /// Newest rounds first.
    pub fn recent(&self, limit: usize) -> Vec<Activity> {
        self.latency.read_delay();
        let mut activities = self.activities.lock().clone();
        activities.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        activities.truncate(limit);
        activities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ActivityStore {
        ActivityStore::from_embedded()
            .unwrap()
            .with_latency(StoreLatency::none())
    }

    #[test]
    fn test_seeded_activities() {
        let activities = store().get_all();
        assert_eq!(activities.len(), 3);
    }

    #[test]
    fn test_get_by_kind() {
        let letter_rounds = store().get_by_kind(ActivityKind::LetterSound);
        assert_eq!(letter_rounds.len(), 2);
    }

    #[test]
    fn test_create_stamps_time_and_id() {
        let store = store();
        let activity = store.create(ActivityKind::WordBuilding, 90);

        assert_eq!(activity.id, 4);
        assert!(activity.completed_at > 0);
        assert_eq!(store.get_all().len(), 4);
    }

    #[test]
    fn test_create_caps_score() {
        let activity = store().create(ActivityKind::LetterSound, 250);
        assert_eq!(activity.score, 100);
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let store = store();
        store.create(ActivityKind::LetterSound, 70);

        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].completed_at >= recent[1].completed_at);
        assert_eq!(recent[0].id, 4);
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&ActivityKind::LetterSound).unwrap();
        assert_eq!(json, "\"letter-sound\"");
    }
}
