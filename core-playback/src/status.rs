//! Bridge between host status pushes and the session.
//!
//! Each resource gets its own listener stamped with the generation it was
//! created for. Listeners only enqueue; the session drains the queue and
//! drops anything that does not belong to the live generation.

use bridge_traits::playback::{PlaybackStatus, PlaybackStatusListener};
use core_async::sync::mpsc;

/// Monotonic tag for one resource instance.
pub type Generation = u64;

/// A status push tagged with the resource it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub generation: Generation,
    pub status: PlaybackStatus,
}

pub(crate) struct GenerationListener {
    generation: Generation,
    tx: mpsc::UnboundedSender<StatusUpdate>,
}

impl GenerationListener {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<StatusUpdate>) -> Self {
        Self { generation, tx }
    }
}

impl PlaybackStatusListener for GenerationListener {
    fn on_status(&self, status: PlaybackStatus) {
        // The receiver is gone once the session shuts down.
        let _ = self.tx.send(StatusUpdate {
            generation: self.generation,
            status,
        });
    }
}
