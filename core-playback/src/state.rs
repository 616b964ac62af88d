//! Observable session state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the session is in its per-track lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No resource and no request in flight.
    #[default]
    Idle,
    /// A resource is being created for `pending_track_id`.
    Loading,
    Playing,
    Paused,
}

impl PlaybackPhase {
    /// `Playing` and `Paused` are the only phases with a live resource.
    pub fn has_resource(self) -> bool {
        matches!(self, PlaybackPhase::Playing | PlaybackPhase::Paused)
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackPhase::Idle => "idle",
            PlaybackPhase::Loading => "loading",
            PlaybackPhase::Playing => "playing",
            PlaybackPhase::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Everything a UI surface needs to render "now playing".
///
/// `current_track_id` is set exactly when the phase has a live resource.
/// While loading, the requested id is in `pending_track_id` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub current_track_id: Option<String>,
    pub pending_track_id: Option<String>,
    pub is_playing: bool,
    pub position_ms: u64,
    pub duration_ms: u64,
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn loading(track_id: &str) -> Self {
        Self {
            phase: PlaybackPhase::Loading,
            pending_track_id: Some(track_id.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn started(track_id: &str) -> Self {
        Self {
            phase: PlaybackPhase::Playing,
            current_track_id: Some(track_id.to_string()),
            is_playing: true,
            ..Self::default()
        }
    }

    /// `true` when `track_id` is the loaded track, playing or paused.
    pub fn is_current(&self, track_id: &str) -> bool {
        self.current_track_id.as_deref() == Some(track_id)
    }

    /// `true` when `track_id` is loaded and audible; drives per-row play icons.
    pub fn is_playing_track(&self, track_id: &str) -> bool {
        self.is_playing && self.is_current(track_id)
    }

    /// Progress in `0.0..=1.0`, or `0.0` while the duration is unknown.
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0) as f32
    }
}

/// What a `play` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Track had no usable id, or the session is shut down. Nothing changed.
    Ignored,
    /// Same track was playing; it is now paused in place.
    Paused,
    /// Same track was paused; it is playing again.
    Resumed,
    /// A new resource was created and is playing.
    Started,
    /// Loading failed (session is idle) or a pause/resume call failed
    /// (state unchanged). Details are logged and published as an event.
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_snapshot_has_no_identity() {
        let snap = PlaybackSnapshot::idle();
        assert_eq!(snap.phase, PlaybackPhase::Idle);
        assert!(snap.current_track_id.is_none());
        assert!(!snap.phase.has_resource());
    }

    #[test]
    fn loading_keeps_request_out_of_current() {
        let snap = PlaybackSnapshot::loading("a.mp3");
        assert_eq!(snap.pending_track_id.as_deref(), Some("a.mp3"));
        assert!(snap.current_track_id.is_none());
        assert!(!snap.is_current("a.mp3"));
    }

    #[test]
    fn playing_track_helpers() {
        let mut snap = PlaybackSnapshot::started("a.mp3");
        assert!(snap.is_playing_track("a.mp3"));
        assert!(!snap.is_playing_track("b.mp3"));

        snap.is_playing = false;
        assert!(snap.is_current("a.mp3"));
        assert!(!snap.is_playing_track("a.mp3"));
    }

    #[test]
    fn progress_handles_unknown_duration() {
        let mut snap = PlaybackSnapshot::started("a.mp3");
        snap.position_ms = 30_000;
        assert_eq!(snap.progress(), 0.0);

        snap.duration_ms = 120_000;
        assert!((snap.progress() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn snapshot_serializes_for_ui_hosts() {
        let json = serde_json::to_value(PlaybackSnapshot::started("a.mp3")).unwrap();
        assert_eq!(json["phase"], "Playing");
        assert_eq!(json["current_track_id"], "a.mp3");
        assert!(json["pending_track_id"].is_null());
    }
}
