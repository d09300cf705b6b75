//! Playback backend abstraction.
//!
//! Two mutually-exclusive playback paths sit behind one capability trait,
//! chosen once at initialization: the buffered path keeps fully decoded
//! sample buffers and spins up a throwaway sink per play, the element
//! path keeps one reusable stateful handle per URL. Selection degrades
//! silently: if the low-latency buffered output cannot be constructed,
//! the element path is used instead, and initialization never fails the
//! caller.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::buffered::{BufferedBackend, DecodedClip};
use super::element::{ElementBackend, SoundElement};
use super::loader::SoundLoader;
use super::PlaybackConfig;
use crate::error::AudioError;

/// Configured backend choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Prefer buffered, fall back to element
    #[default]
    Auto,
    /// Same as auto today: buffered still needs a working output device
    Buffered,
    /// Skip the buffered path entirely
    Element,
}

/// Which backend actually got selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Buffered,
    Element,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Buffered => write!(f, "buffered"),
            BackendKind::Element => write!(f, "element"),
        }
    }
}

/// A successfully loaded sound, in whichever shape the active backend uses.
#[derive(Clone)]
pub enum LoadedSound {
    Buffered(Arc<DecodedClip>),
    Element(Arc<SoundElement>),
}

/// A preload failure, tagged with whether the URL should be written off.
///
/// Terminal failures become the permanent "failed" cache sentinel; transient
/// ones leave the slot empty so a later call may try again.
pub struct PreloadFailure {
    pub error: AudioError,
    pub terminal: bool,
}

impl PreloadFailure {
    pub fn transient(error: AudioError) -> Self {
        Self {
            error,
            terminal: false,
        }
    }

    pub fn terminal(error: AudioError) -> Self {
        Self {
            error,
            terminal: true,
        }
    }
}

/// Capability surface shared by both playback paths.
pub trait PlaybackBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Load a URL into whatever cached shape this backend plays from.
    fn preload(
        &self,
        url: &str,
        loader: &Arc<SoundLoader>,
        volume: f32,
    ) -> Result<LoadedSound, PreloadFailure>;

    /// Trigger playback of a previously loaded sound at the given volume.
    fn play(&self, sound: &LoadedSound, volume: f32) -> Result<(), AudioError>;

    /// Re-apply the effective volume to every live handle.
    ///
    /// Only meaningful for the element path; buffered playback reads volume
    /// at trigger time.
    fn apply_volume(&self, volume: f32);

    /// Release every live handle ahead of a full manager reset.
    fn shutdown(&self);
}

/// Select a backend per the configured preference.
///
/// Never fails: the element path works without an up-front output device
/// (each handle opens its own on load), so there is always something to
/// return.
pub fn select_backend(config: &PlaybackConfig) -> Arc<dyn PlaybackBackend> {
    let retry = config.retry_policy();

    if config.backend == BackendPreference::Element {
        tracing::info!("Element audio playback selected by configuration");
        return Arc::new(ElementBackend::new(retry));
    }

    match BufferedBackend::new() {
        Ok(backend) => {
            tracing::info!("Low-latency buffered audio output ready");
            Arc::new(backend)
        }
        Err(e) => {
            tracing::warn!(
                "Buffered audio output unavailable, falling back to element playback: {}",
                e
            );
            Arc::new(ElementBackend::new(retry))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_preference_serde() {
        let pref: BackendPreference = serde_json::from_str("\"element\"").unwrap();
        assert_eq!(pref, BackendPreference::Element);
        assert_eq!(serde_json::to_string(&BackendPreference::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn test_forced_element_selection() {
        let config = PlaybackConfig {
            backend: BackendPreference::Element,
            ..PlaybackConfig::default()
        };
        let backend = select_backend(&config);
        assert_eq!(backend.kind(), BackendKind::Element);
    }

    #[test]
    fn test_auto_selection_always_yields_a_backend() {
        // With or without an output device this must not fail.
        let backend = select_backend(&PlaybackConfig::default());
        let _ = backend.kind();
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Buffered.to_string(), "buffered");
        assert_eq!(BackendKind::Element.to_string(), "element");
    }
}
