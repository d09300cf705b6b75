//! Audio playback subsystem.
//!
//! Owns backend selection, per-URL sound caching, global volume/mute state,
//! and resilient loading with retry. Games keep running even when audio
//! fails: nothing in here propagates an error into a caller, playback
//! problems surface as toast notifications on the event bus.
//!
//! ## Architecture
//!
//! ```text
//! AudioPlaybackManager
//!   ├── cache: url → {loading | cached | failed}
//!   ├── volume / mute state
//!   └── PlaybackBackend (chosen once at initialization)
//!         ├── BufferedBackend   decoded sample buffers, fresh sink per play
//!         └── ElementBackend    one reusable SoundElement handle per url
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let manager = AudioPlaybackManager::new(PlaybackConfig::default(), bus);
//!
//! manager.preload_letter_sounds(&letters);
//! manager.play_sound("sounds/letters/a.mp3");
//!
//! manager.set_volume(0.5);
//! manager.mute();
//! ```

pub mod backend;
pub mod buffered;
pub mod element;
pub mod loader;
pub mod manager;
mod output;

pub use backend::{BackendKind, BackendPreference, LoadedSound, PlaybackBackend};
pub use buffered::{BufferedBackend, DecodedClip};
pub use element::{ElementBackend, SoundElement};
pub use loader::{SoundLoader, SoundSource};
pub use manager::AudioPlaybackManager;

use std::path::PathBuf;
use std::time::Duration;

/// Tunables for the playback subsystem.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Which backend to select at initialization
    pub backend: BackendPreference,
    /// Load attempts before a sound is marked permanently unavailable
    pub max_attempts: u32,
    /// Bound on the element-based "ready to play" wait per attempt
    pub ready_timeout: Duration,
    /// Base delay for exponential backoff between attempts
    pub retry_backoff: Duration,
    /// Directory relative sound URLs resolve against
    pub sounds_dir: PathBuf,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            max_attempts: 3,
            ready_timeout: Duration::from_secs(10),
            retry_backoff: Duration::from_millis(500),
            sounds_dir: PathBuf::from("sounds"),
        }
    }
}

impl PlaybackConfig {
    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            ready_timeout: self.ready_timeout,
            backoff: self.retry_backoff,
        }
    }
}

/// Retry discipline for the element-based load path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_attempts: u32,
    pub ready_timeout: Duration,
    pub backoff: Duration,
}

/// Anything that may carry a sound resource URL.
///
/// Implemented by the letter and word entities so bulk preloading does not
/// depend on a concrete store type. Entries without a URL are skipped, not
/// counted as failures.
pub trait SoundCue {
    fn audio_url(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_playback_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.backend, BackendPreference::Auto);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.ready_timeout, Duration::from_secs(10));
        assert_eq!(config.retry_backoff, Duration::from_millis(500));
    }

    #[test]
    fn test_retry_policy_floors_attempts() {
        let config = PlaybackConfig {
            max_attempts: 0,
            ..PlaybackConfig::default()
        };
        assert_eq!(config.retry_policy().max_attempts, 1);
    }
}
