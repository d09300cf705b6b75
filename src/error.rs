use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// These errors represent domain-specific failures that can occur during
/// application operation. They provide context and can be chained with anyhow.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Sound file not found: {url}")]
    SourceMissing { url: String },

    #[error("No network path to sound resource: {url}")]
    Unreachable { url: String },

    #[error("Failed to fetch sound resource: {url}")]
    FetchFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Sound did not become ready within {timeout_secs}s: {url}")]
    ReadyTimeout { url: String, timeout_secs: u64 },

    #[error("Giving up on sound after {attempts} attempts: {url}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Cached sound does not match the active playback backend")]
    BackendMismatch,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: u32 },

    #[error("Failed to parse embedded {entity} seed data")]
    SeedParseFailed {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = AudioError::SourceMissing {
            url: "sounds/letters/q.mp3".to_string(),
        };
        assert_eq!(err.to_string(), "Sound file not found: sounds/letters/q.mp3");

        let err = StoreError::NotFound {
            entity: "Letter",
            id: 42,
        };
        assert_eq!(err.to_string(), "Letter not found: 42");
    }

    #[test]
    fn test_error_source_chain() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "Failed to load configuration from /test/config.json"
        );
    }

    #[test]
    fn test_retries_exhausted_chain() {
        let inner = AudioError::ReadyTimeout {
            url: "sounds/letters/a.mp3".to_string(),
            timeout_secs: 10,
        };
        let err = AudioError::RetriesExhausted {
            url: "sounds/letters/a.mp3".to_string(),
            attempts: 3,
            source: Box::new(inner),
        };

        assert!(err.source().is_some());
        assert!(err.to_string().contains("3 attempts"));
    }
}
