//! Output-stream keepalive.
//!
//! rodio's `OutputStream` must stay alive for as long as anything plays
//! through it, but it is not `Send`, so it cannot live inside a shared
//! manager. A dedicated holder thread owns the stream and parks on a
//! channel; the `Send + Sync` stream handle is what the rest of the
//! subsystem passes around. Dropping the [`OutputHandle`] disconnects the
//! channel and lets the holder thread release the device.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Sender};
use rodio::{OutputStream, OutputStreamHandle};

use crate::error::AudioError;

/// How long to wait for the platform to hand over an output device.
const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// A live output device, held open by a background thread.
pub(crate) struct OutputHandle {
    handle: OutputStreamHandle,
    _keepalive: Sender<()>,
}

impl OutputHandle {
    pub(crate) fn stream(&self) -> &OutputStreamHandle {
        &self.handle
    }
}

/// Open the default output device on a holder thread.
pub(crate) fn open_output() -> Result<OutputHandle, AudioError> {
    let (ready_tx, ready_rx) = bounded(1);
    let (keepalive_tx, keepalive_rx) = bounded::<()>(0);

    thread::Builder::new()
        .name("audio-output".to_string())
        .spawn(move || match OutputStream::try_default() {
            Ok((stream, handle)) => {
                if ready_tx.send(Ok(handle)).is_err() {
                    return;
                }
                // Blocks until every keepalive sender is dropped.
                let _ = keepalive_rx.recv();
                drop(stream);
            }
            Err(e) => {
                let _ = ready_tx.send(Err(AudioError::StreamInitFailed(Box::new(e))));
            }
        })
        .map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

    let handle = match ready_rx.recv_timeout(OPEN_TIMEOUT) {
        Ok(result) => result?,
        Err(e) => return Err(AudioError::StreamInitFailed(Box::new(e))),
    };

    Ok(OutputHandle {
        handle,
        _keepalive: keepalive_tx,
    })
}
