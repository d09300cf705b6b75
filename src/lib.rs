//! Phonics learning games with resilient sound playback.
//!
//! The interesting part lives in [`audio`]: a playback manager that
//! selects between a buffered and an element-based backend, caches
//! sounds per URL with in-flight de-duplication, retries failed loads
//! with backoff, and degrades gracefully — a broken sound never breaks
//! a game. Around it sit the JSON-seeded data stores ([`services`]),
//! the toast/event bus ([`messaging`]), pure game-round logic
//! ([`games`]) and the on-disk configuration ([`config`]).

pub mod audio;
pub mod config;
pub mod error;
pub mod games;
pub mod messaging;
pub mod services;
