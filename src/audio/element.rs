//! Element-based playback path.
//!
//! The fallback when the buffered output cannot be constructed. Each URL
//! gets one reusable [`SoundElement`] handle owning its own output stream
//! and sink, so volume changes can be re-applied to live handles and a
//! replay rewinds to the start. Loading waits for a decode-verified
//! "ready" signal with a bounded timeout and retries with exponential
//! backoff before writing the URL off.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::bounded;
use parking_lot::Mutex;
use rodio::{Decoder, Sink};

use super::backend::{BackendKind, LoadedSound, PlaybackBackend, PreloadFailure};
use super::loader::SoundLoader;
use super::output::{open_output, OutputHandle};
use super::RetryPolicy;
use crate::error::AudioError;

/// A reusable, stateful playback handle for one URL.
pub struct SoundElement {
    url: String,
    bytes: Arc<Vec<u8>>,
    output: OutputHandle,
    sink: Mutex<Option<Sink>>,
    volume: Mutex<f32>,
}

impl SoundElement {
    /// Construct a handle: fetchable bytes in hand, open an output stream
    /// and verify the sound decodes end to end ("ready to play through").
    fn load(url: &str, bytes: Vec<u8>, volume: f32) -> Result<Self, AudioError> {
        let output = open_output()?;

        let bytes = Arc::new(bytes);
        let decoder = Decoder::new(std::io::Cursor::new((*bytes).clone()))
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;
        // Run the decoder dry once so a truncated or unsupported stream
        // fails here instead of at play time.
        let _ = decoder.count();

        Ok(Self {
            url: url.to_string(),
            bytes,
            output,
            sink: Mutex::new(None),
            volume: Mutex::new(volume),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Volume this handle last had applied.
    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    /// Re-apply volume to the handle, including any live sink.
    pub fn set_volume(&self, volume: f32) {
        let slot = self.sink.lock();
        *self.volume.lock() = volume;
        if let Some(sink) = &*slot {
            sink.set_volume(volume);
        }
    }

    /// Rewind to the start and trigger playback.
    fn play(&self, volume: f32) -> Result<(), AudioError> {
        let mut slot = self.sink.lock();
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        // A fresh sink is the rewind: the old one is gone, the new one
        // starts the sound from sample zero.
        let sink = Sink::try_new(self.output.stream())
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        sink.set_volume(volume);
        *self.volume.lock() = volume;

        let decoder = Decoder::new(std::io::Cursor::new((*self.bytes).clone()))
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;
        sink.append(decoder);
        sink.play();

        *slot = Some(sink);
        Ok(())
    }

    /// Stop playback and drop the sink so the platform frees the device.
    pub fn release(&self) {
        if let Some(sink) = self.sink.lock().take() {
            sink.stop();
        }
    }
}

impl Drop for SoundElement {
    fn drop(&mut self) {
        self.release();
    }
}

/// Element playback over per-URL handles.
pub struct ElementBackend {
    handles: Mutex<HashMap<String, Arc<SoundElement>>>,
    retry: RetryPolicy,
}

impl ElementBackend {
    pub(crate) fn new(retry: RetryPolicy) -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
            retry,
        }
    }

    /// One load attempt, bounded by the ready timeout.
    fn try_load(
        &self,
        url: &str,
        loader: &Arc<SoundLoader>,
        volume: f32,
    ) -> Result<Arc<SoundElement>, AudioError> {
        let (tx, rx) = bounded(1);
        let url_owned = url.to_string();
        let loader = Arc::clone(loader);

        thread::spawn(move || {
            let result = loader
                .fetch(&url_owned)
                .and_then(|bytes| SoundElement::load(&url_owned, bytes, volume))
                .map(Arc::new);
            // Receiver gone means the attempt timed out; the element (and
            // its output thread) is torn down right here.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(self.retry.ready_timeout) {
            Ok(result) => result,
            Err(_) => Err(AudioError::ReadyTimeout {
                url: url.to_string(),
                timeout_secs: self.retry.ready_timeout.as_secs(),
            }),
        }
    }
}

impl PlaybackBackend for ElementBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Element
    }

    fn preload(
        &self,
        url: &str,
        loader: &Arc<SoundLoader>,
        volume: f32,
    ) -> Result<LoadedSound, PreloadFailure> {
        let mut last_error: Option<AudioError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.try_load(url, loader, volume) {
                Ok(element) => {
                    if attempt > 1 {
                        tracing::info!("Sound preload succeeded on attempt {}: {}", attempt, url);
                    }
                    self.handles
                        .lock()
                        .insert(url.to_string(), Arc::clone(&element));
                    return Ok(LoadedSound::Element(element));
                }
                Err(e) => {
                    tracing::warn!(
                        "Sound preload attempt {}/{} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        e
                    );
                    last_error = Some(e);

                    if attempt < self.retry.max_attempts {
                        thread::sleep(self.retry.backoff * 2u32.pow(attempt));
                    }
                }
            }
        }

        let source: Box<dyn std::error::Error + Send + Sync> = match last_error {
            Some(e) => Box::new(e),
            None => "no load attempts were made".into(),
        };
        Err(PreloadFailure::terminal(AudioError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.retry.max_attempts,
            source,
        }))
    }

    fn play(&self, sound: &LoadedSound, volume: f32) -> Result<(), AudioError> {
        match sound {
            LoadedSound::Element(element) => element.play(volume),
            LoadedSound::Buffered(_) => Err(AudioError::BackendMismatch),
        }
    }

    fn apply_volume(&self, volume: f32) {
        for element in self.handles.lock().values() {
            element.set_volume(volume);
        }
    }

    fn shutdown(&self) {
        let mut handles = self.handles.lock();
        for element in handles.values() {
            element.release();
        }
        handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            ready_timeout: Duration::from_secs(2),
            backoff: Duration::from_millis(1),
        }
    }

    fn loader_for_missing_dir() -> Arc<SoundLoader> {
        Arc::new(SoundLoader::new(
            std::env::temp_dir().join("phonics-element-none"),
        ))
    }

    #[test]
    fn test_exhausted_retries_are_terminal() {
        let backend = ElementBackend::new(fast_retry());
        let loader = loader_for_missing_dir();

        let failure = backend
            .preload("sounds/letters/q.mp3", &loader, 1.0)
            .err()
            .expect("missing file must not preload");

        assert!(failure.terminal);
        assert!(matches!(
            failure.error,
            AudioError::RetriesExhausted { attempts: 3, .. }
        ));
        assert_eq!(loader.fetch_attempts(), 3);
    }

    #[test]
    fn test_play_rejects_foreign_sound() {
        let backend = ElementBackend::new(fast_retry());
        let clip = crate::audio::DecodedClip::decode(test_wav()).unwrap();
        let sound = LoadedSound::Buffered(Arc::new(clip));

        let err = backend.play(&sound, 1.0).unwrap_err();
        assert!(matches!(err, AudioError::BackendMismatch));
    }

    #[test]
    fn test_shutdown_clears_handles() {
        let backend = ElementBackend::new(fast_retry());
        backend.shutdown();
        assert!(backend.handles.lock().is_empty());
    }

    fn test_wav() -> Vec<u8> {
        let path = std::env::temp_dir().join("phonics-element-fixture.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..441 {
            writer.write_sample((i % 32) as i16 * 128).unwrap();
        }
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        bytes
    }
}
