//! Sound resource fetching.
//!
//! Sound URLs follow the app's addressing convention
//! (`sounds/letters/a.mp3`, `sounds/words/cat.mp3`): relative paths
//! resolve against the configured sounds directory, absolute `http(s)`
//! URLs are fetched over the network. Reachability problems fail fast
//! with a descriptive error instead of riding out the ready timeout.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::AudioError;

/// Where a sound URL actually points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    Local(PathBuf),
    Remote(String),
}

impl SoundSource {
    /// Resolve a caller-supplied URL against the sounds directory.
    pub fn resolve(url: &str, sounds_dir: &Path) -> Self {
        if url.starts_with("http://") || url.starts_with("https://") {
            SoundSource::Remote(url.to_string())
        } else {
            SoundSource::Local(sounds_dir.join(url.trim_start_matches('/')))
        }
    }
}

/// Fetches raw sound bytes for both playback backends.
pub struct SoundLoader {
    sounds_dir: PathBuf,
    agent: ureq::Agent,
    fetch_attempts: AtomicU64,
}

impl SoundLoader {
    pub fn new(sounds_dir: PathBuf) -> Self {
        // Short connect timeout so an unreachable host fails the attempt
        // quickly instead of eating into the ready wait.
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(2))
            .timeout(Duration::from_secs(15))
            .build();

        Self {
            sounds_dir,
            agent,
            fetch_attempts: AtomicU64::new(0),
        }
    }

    /// Fetch the raw bytes behind a sound URL.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, AudioError> {
        self.fetch_attempts.fetch_add(1, Ordering::Relaxed);

        match SoundSource::resolve(url, &self.sounds_dir) {
            SoundSource::Local(path) => {
                if !path.exists() {
                    return Err(AudioError::SourceMissing {
                        url: url.to_string(),
                    });
                }
                fs::read(&path).map_err(|e| AudioError::FetchFailed {
                    url: url.to_string(),
                    source: Box::new(e),
                })
            }
            SoundSource::Remote(remote) => {
                let response = self.agent.get(&remote).call().map_err(|e| match e {
                    ureq::Error::Transport(transport)
                        if matches!(
                            transport.kind(),
                            ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed
                        ) =>
                    {
                        AudioError::Unreachable {
                            url: url.to_string(),
                        }
                    }
                    other => AudioError::FetchFailed {
                        url: url.to_string(),
                        source: Box::new(other),
                    },
                })?;

                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .map_err(|e| AudioError::FetchFailed {
                        url: url.to_string(),
                        source: Box::new(e),
                    })?;
                Ok(bytes)
            }
        }
    }

    /// Total fetch attempts since construction, across every URL.
    pub fn fetch_attempts(&self) -> u64 {
        self.fetch_attempts.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_url() {
        let source = SoundSource::resolve("sounds/letters/a.mp3", Path::new("/assets"));
        assert_eq!(
            source,
            SoundSource::Local(PathBuf::from("/assets/sounds/letters/a.mp3"))
        );
    }

    #[test]
    fn test_resolve_strips_leading_slash() {
        let source = SoundSource::resolve("/sounds/letters/a.mp3", Path::new("/assets"));
        assert_eq!(
            source,
            SoundSource::Local(PathBuf::from("/assets/sounds/letters/a.mp3"))
        );
    }

    #[test]
    fn test_resolve_remote_url() {
        let source = SoundSource::resolve("https://cdn.example.com/a.mp3", Path::new("/assets"));
        assert_eq!(
            source,
            SoundSource::Remote("https://cdn.example.com/a.mp3".to_string())
        );
    }

    #[test]
    fn test_fetch_missing_file_is_descriptive() {
        let loader = SoundLoader::new(std::env::temp_dir().join("phonics-play-none"));
        let err = loader.fetch("sounds/letters/a.mp3").unwrap_err();

        assert!(matches!(err, AudioError::SourceMissing { .. }));
        assert_eq!(loader.fetch_attempts(), 1);
    }

    #[test]
    fn test_fetch_counts_every_attempt() {
        let loader = SoundLoader::new(std::env::temp_dir().join("phonics-play-none"));
        let _ = loader.fetch("sounds/letters/a.mp3");
        let _ = loader.fetch("sounds/letters/b.mp3");
        let _ = loader.fetch("sounds/letters/a.mp3");

        assert_eq!(loader.fetch_attempts(), 3);
    }
}
