//! Pub/sub messaging between the audio subsystem and the front end.
//!
//! The audio manager never talks to the UI directly: it publishes events
//! (toast notifications, playback lifecycle) onto an [`EventBus`] and any
//! number of subscribers render them however they like. Publishing is
//! non-blocking; a slow or dropped subscriber never stalls playback.

pub mod bus;
pub mod events;

pub use bus::{EventBus, SubscriberId};
pub use events::{Event, Severity};
