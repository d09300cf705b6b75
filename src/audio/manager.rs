//! The playback manager.
//!
//! One instance per running application, constructed by the composition
//! root and shared behind an `Arc`. Owns the per-URL sound cache, the
//! global volume/mute state, and the backend selected at initialization.
//! Every public operation resolves to a success indicator; nothing here
//! raises into caller code, so game flows keep running when audio fails.
//!
//! Cache life cycle per URL: absent → loading → cached or failed. A
//! failed entry is permanent until [`AudioPlaybackManager::cleanup`]
//! wipes the manager back to its uninitialized state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use rayon::prelude::*;

use super::backend::{select_backend, BackendKind, LoadedSound, PlaybackBackend};
use super::loader::SoundLoader;
use super::{PlaybackConfig, SoundCue};
use crate::messaging::{Event, EventBus, Severity};

const DEFAULT_VOLUME: f32 = 1.0;

/// Shared completion gate for one in-flight load.
///
/// The first caller to claim a URL performs the load; everyone else who
/// arrives while it is in flight waits here and observes the same outcome
/// instead of starting a duplicate fetch.
#[derive(Default)]
struct LoadGate {
    outcome: Mutex<Option<bool>>,
    cond: Condvar,
}

impl LoadGate {
    fn wait(&self) -> bool {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(ok) = *outcome {
                return ok;
            }
            self.cond.wait(&mut outcome);
        }
    }

    fn complete(&self, ok: bool) {
        *self.outcome.lock() = Some(ok);
        self.cond.notify_all();
    }
}

enum CacheEntry {
    Loading(Arc<LoadGate>),
    Ready(LoadedSound),
    Failed,
}

/// Playback, caching and volume state for the whole application.
pub struct AudioPlaybackManager {
    config: PlaybackConfig,
    bus: EventBus,
    loader: Arc<SoundLoader>,
    backend: Mutex<Option<Arc<dyn PlaybackBackend>>>,
    cache: Mutex<HashMap<String, CacheEntry>>,
    volume: Mutex<f32>,
    muted: AtomicBool,
    /// Bumped by cleanup so a load finishing afterwards cannot repopulate
    /// the fresh cache.
    epoch: AtomicU64,
}

impl AudioPlaybackManager {
    pub fn new(config: PlaybackConfig, bus: EventBus) -> Self {
        let loader = Arc::new(SoundLoader::new(config.sounds_dir.clone()));
        Self {
            config,
            bus,
            loader,
            backend: Mutex::new(None),
            cache: Mutex::new(HashMap::new()),
            volume: Mutex::new(DEFAULT_VOLUME),
            muted: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
        }
    }

    /// Select the playback backend if that has not happened yet.
    ///
    /// Idempotent and safe to call concurrently: callers serialize on the
    /// backend slot, so late arrivals observe the first attempt's result
    /// rather than racing their own. Never fails — selection degrades to
    /// the element path instead of erroring.
    pub fn initialize(&self) {
        let _ = self.ensure_backend();
    }

    fn ensure_backend(&self) -> Arc<dyn PlaybackBackend> {
        let mut slot = self.backend.lock();
        if let Some(backend) = &*slot {
            return Arc::clone(backend);
        }
        let backend = select_backend(&self.config);
        *slot = Some(Arc::clone(&backend));
        backend
    }

    /// Which backend is active, if initialization has run.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.lock().as_ref().map(|b| b.kind())
    }

    /// Load a sound into the cache ahead of playback.
    ///
    /// Returns `true` on a cache hit, on a URL already written off as
    /// failed (the no-op contract), or on a successful load; `false` when
    /// this call's load failed. Concurrent calls for the same URL converge
    /// on one underlying fetch.
    pub fn preload_audio(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }
        let backend = self.ensure_backend();
        let epoch = self.epoch.load(Ordering::SeqCst);

        enum Claim {
            Done,
            Wait(Arc<LoadGate>),
            Load(Arc<LoadGate>),
        }

        let claim = {
            let mut cache = self.cache.lock();
            match cache.get(url) {
                Some(CacheEntry::Ready(_)) | Some(CacheEntry::Failed) => Claim::Done,
                Some(CacheEntry::Loading(gate)) => Claim::Wait(Arc::clone(gate)),
                None => {
                    let gate = Arc::new(LoadGate::default());
                    cache.insert(url.to_string(), CacheEntry::Loading(Arc::clone(&gate)));
                    Claim::Load(gate)
                }
            }
        };

        match claim {
            Claim::Done => true,
            Claim::Wait(gate) => gate.wait(),
            Claim::Load(gate) => {
                let ok = match backend.preload(url, &self.loader, self.effective_volume()) {
                    Ok(sound) => {
                        self.store(epoch, url, CacheEntry::Ready(sound));
                        true
                    }
                    Err(failure) => {
                        tracing::error!("Failed to preload audio {}: {}", url, failure.error);
                        if failure.terminal {
                            self.store(epoch, url, CacheEntry::Failed);
                            self.bus
                                .notify(Severity::Warning, "Audio may not be available for some sounds");
                        } else {
                            self.forget(epoch, url);
                        }
                        false
                    }
                };
                gate.complete(ok);
                ok
            }
        }
    }

    /// Play a sound, loading it on demand.
    ///
    /// Silent no-op (`false`) for an empty URL or while muted. Never
    /// raises: failures are logged, surfaced as toasts, and reported as
    /// `false`.
    pub fn play_sound(&self, url: &str) -> bool {
        if url.is_empty() || self.is_muted() {
            return false;
        }
        let backend = self.ensure_backend();

        enum Step {
            Play(LoadedSound),
            Wait(Arc<LoadGate>),
            Preload,
            Unavailable,
        }

        loop {
            let step = match self.cache.lock().get(url) {
                Some(CacheEntry::Ready(sound)) => Step::Play(sound.clone()),
                Some(CacheEntry::Loading(gate)) => Step::Wait(Arc::clone(gate)),
                Some(CacheEntry::Failed) => Step::Unavailable,
                None => Step::Preload,
            };

            match step {
                Step::Play(sound) => {
                    return match backend.play(&sound, self.effective_volume()) {
                        Ok(()) => {
                            self.bus.publish(Event::PlaybackStarted {
                                url: url.to_string(),
                            });
                            true
                        }
                        Err(e) => {
                            tracing::error!("Failed to play sound {}: {}", url, e);
                            self.bus.notify(
                                Severity::Error,
                                format!("Audio not available for this {}", subject_of(url)),
                            );
                            false
                        }
                    };
                }
                Step::Wait(gate) => {
                    gate.wait();
                }
                Step::Unavailable => {
                    // Pre-known failure: softer notice than a playback error.
                    tracing::warn!("Audio not available: {}", url);
                    self.bus
                        .notify(Severity::Info, "Audio not available for this sound");
                    return false;
                }
                Step::Preload => {
                    if !self.preload_audio(url) {
                        // A terminal failure left the sentinel behind; loop
                        // once more so it surfaces through the path above.
                        if matches!(self.cache.lock().get(url), Some(CacheEntry::Failed)) {
                            continue;
                        }
                        self.bus.notify(
                            Severity::Error,
                            format!("Audio not available for this {}", subject_of(url)),
                        );
                        return false;
                    }
                }
            }
        }
    }

    /// Preload every entry that carries a sound URL, concurrently.
    ///
    /// Entries without a URL are skipped. Individual failures are already
    /// recorded and surfaced by [`Self::preload_audio`]; the return value
    /// is the number of sounds that made it into the cache.
    pub fn preload_letter_sounds<T: SoundCue + Sync>(&self, items: &[T]) -> usize {
        let urls: Vec<&str> = items.iter().filter_map(|item| item.audio_url()).collect();
        let total = urls.len();

        let loaded = urls
            .par_iter()
            .filter(|url| self.preload_audio(url))
            .count();

        tracing::info!("Preloaded {}/{} letter sounds", loaded, total);
        loaded
    }

    /// Clamped to `[0, 1]` and re-applied immediately to live handles.
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        *self.volume.lock() = clamped;
        self.apply_volume_to_backend();
    }

    pub fn get_volume(&self) -> f32 {
        *self.volume.lock()
    }

    pub fn mute(&self) {
        self.muted.store(true, Ordering::SeqCst);
        self.apply_volume_to_backend();
    }

    pub fn unmute(&self) {
        self.muted.store(false, Ordering::SeqCst);
        self.apply_volume_to_backend();
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn effective_volume(&self) -> f32 {
        if self.is_muted() {
            0.0
        } else {
            *self.volume.lock()
        }
    }

    fn apply_volume_to_backend(&self) {
        if let Some(backend) = &*self.backend.lock() {
            backend.apply_volume(self.effective_volume());
        }
    }

    /// Number of sounds currently cached and playable.
    pub fn cached_count(&self) -> usize {
        self.cache
            .lock()
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Ready(_)))
            .count()
    }

    /// Total fetch attempts made on behalf of this manager.
    pub fn fetch_attempts(&self) -> u64 {
        self.loader.fetch_attempts()
    }

    /// Full reset: release every cached sound, tear down the backend and
    /// restore default volume/mute state. A later call re-initializes
    /// from scratch.
    pub fn cleanup(&self) {
        let entries: Vec<CacheEntry> = {
            let mut cache = self.cache.lock();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            cache.drain().map(|(_, entry)| entry).collect()
        };

        for entry in entries {
            match entry {
                CacheEntry::Ready(LoadedSound::Element(element)) => element.release(),
                // Waiters must not hang across a reset.
                CacheEntry::Loading(gate) => gate.complete(false),
                _ => {}
            }
        }

        if let Some(backend) = self.backend.lock().take() {
            backend.shutdown();
        }

        *self.volume.lock() = DEFAULT_VOLUME;
        self.muted.store(false, Ordering::SeqCst);
        tracing::info!("Audio manager reset");
    }

    /// Insert a finished load, unless cleanup ran while it was in flight.
    fn store(&self, epoch: u64, url: &str, entry: CacheEntry) {
        let mut cache = self.cache.lock();
        if self.epoch.load(Ordering::SeqCst) == epoch {
            cache.insert(url.to_string(), entry);
        }
    }

    /// Drop a loading marker after a transient failure.
    fn forget(&self, epoch: u64, url: &str) {
        let mut cache = self.cache.lock();
        if self.epoch.load(Ordering::SeqCst) == epoch {
            if let Some(CacheEntry::Loading(_)) = cache.get(url) {
                cache.remove(url);
            }
        }
    }
}

/// What kind of thing a sound URL names, for notification wording.
fn subject_of(url: &str) -> &'static str {
    if url.contains("letters/") {
        "letter"
    } else if url.contains("words/") {
        "word"
    } else {
        "sound"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BackendPreference;
    use std::time::Duration;

    fn test_manager() -> AudioPlaybackManager {
        let config = PlaybackConfig {
            backend: BackendPreference::Element,
            max_attempts: 3,
            ready_timeout: Duration::from_secs(2),
            retry_backoff: Duration::from_millis(1),
            sounds_dir: std::env::temp_dir().join("phonics-mgr-none"),
        };
        AudioPlaybackManager::new(config, EventBus::new())
    }

    #[test]
    fn test_subject_of() {
        assert_eq!(subject_of("sounds/letters/a.mp3"), "letter");
        assert_eq!(subject_of("/sounds/words/cat.mp3"), "word");
        assert_eq!(subject_of("chime.mp3"), "sound");
    }

    #[test]
    fn test_load_gate_converges_waiters() {
        let gate = Arc::new(LoadGate::default());
        let waiter = {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || gate.wait())
        };

        gate.complete(true);
        assert!(waiter.join().unwrap());
        // Late waiters see the memoized outcome immediately.
        assert!(gate.wait());
    }

    #[test]
    fn test_store_respects_epoch() {
        let manager = test_manager();
        let stale_epoch = manager.epoch.load(Ordering::SeqCst);
        manager.cleanup();

        let clip = crate::audio::DecodedClip::decode(test_wav()).unwrap();
        manager.store(
            stale_epoch,
            "sounds/letters/a.mp3",
            CacheEntry::Ready(LoadedSound::Buffered(Arc::new(clip))),
        );

        assert_eq!(manager.cached_count(), 0);
    }

    #[test]
    fn test_mute_short_circuits_before_backend_init() {
        let manager = test_manager();
        manager.mute();

        assert!(!manager.play_sound("sounds/letters/a.mp3"));
        // The muted early return means no backend and no fetch work.
        assert!(manager.backend_kind().is_none());
        assert_eq!(manager.fetch_attempts(), 0);
    }

    fn test_wav() -> Vec<u8> {
        let path = std::env::temp_dir().join("phonics-mgr-fixture.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..441 {
            writer.write_sample((i % 16) as i16 * 512).unwrap();
        }
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        bytes
    }
}
