//! Buffered playback path.
//!
//! Sounds are fetched and decoded fully into memory at preload time. Each
//! play instantiates a fresh one-shot sink over the decoded samples,
//! applies the effective volume, and detaches, so triggering a sound is
//! cheap and never touches the network or the decoder.

use std::sync::Arc;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, Sink, Source};

use super::backend::{BackendKind, LoadedSound, PlaybackBackend, PreloadFailure};
use super::loader::SoundLoader;
use super::output::{open_output, OutputHandle};
use crate::error::AudioError;

/// A fully decoded, replayable sound.
#[derive(Debug)]
pub struct DecodedClip {
    channels: u16,
    sample_rate: u32,
    samples: Arc<Vec<i16>>,
}

impl DecodedClip {
    /// Decode raw sound bytes into an in-memory sample buffer.
    pub fn decode(bytes: Vec<u8>) -> Result<Self, AudioError> {
        let decoder = Decoder::new(std::io::Cursor::new(bytes))
            .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<i16> = decoder.collect();

        if samples.is_empty() {
            return Err(AudioError::DecodeFailed(
                "decoded stream contained no samples".into(),
            ));
        }

        Ok(Self {
            channels,
            sample_rate,
            samples: Arc::new(samples),
        })
    }

    pub fn duration(&self) -> Duration {
        let per_channel = self.samples.len() as f64 / f64::from(self.channels);
        Duration::from_secs_f64(per_channel / f64::from(self.sample_rate))
    }

    fn to_source(&self) -> SamplesBuffer<i16> {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples.as_ref().clone())
    }
}

/// Low-latency playback over one shared output stream.
pub struct BufferedBackend {
    output: OutputHandle,
}

impl BufferedBackend {
    /// Open the shared output stream. Fails when the platform has no
    /// usable output device, which triggers the element fallback.
    pub fn new() -> Result<Self, AudioError> {
        Ok(Self {
            output: open_output()?,
        })
    }
}

impl PlaybackBackend for BufferedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Buffered
    }

    fn preload(
        &self,
        url: &str,
        loader: &Arc<SoundLoader>,
        _volume: f32,
    ) -> Result<LoadedSound, PreloadFailure> {
        // Fetch or decode failure is a hard failure for this call, but not
        // a permanent one: the slot stays empty and a later call may retry.
        let bytes = loader.fetch(url).map_err(PreloadFailure::transient)?;
        let clip = DecodedClip::decode(bytes).map_err(PreloadFailure::transient)?;

        tracing::debug!(
            "Decoded {} ({:.2}s at {}Hz)",
            url,
            clip.duration().as_secs_f64(),
            clip.sample_rate
        );

        Ok(LoadedSound::Buffered(Arc::new(clip)))
    }

    fn play(&self, sound: &LoadedSound, volume: f32) -> Result<(), AudioError> {
        let clip = match sound {
            LoadedSound::Buffered(clip) => clip,
            LoadedSound::Element(_) => return Err(AudioError::BackendMismatch),
        };

        let sink = Sink::try_new(self.output.stream())
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        sink.set_volume(volume);
        sink.append(clip.to_source());
        // Fire-and-forget: the sink drives itself to completion.
        sink.detach();

        Ok(())
    }

    fn apply_volume(&self, _volume: f32) {
        // Volume is applied per play; in-flight one-shot sinks keep the
        // volume they started with.
    }

    fn shutdown(&self) {
        // The output holder thread exits when the backend drops.
    }
}
