//! Playback bridge traits and supporting audio types.
//!
//! The host owns the actual audio engine (expo-av, AVPlayer, ExoPlayer...).
//! The core only asks it to create a decoded-audio resource from a source,
//! drive its transport, and release it. Each live resource pushes status
//! updates to the [`PlaybackStatusListener`] it was loaded with until it is
//! unloaded.

use crate::error::Result;
use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Byte source a resource is created from.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioSource {
    /// Local file accessible to the host runtime.
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream fetched and decoded progressively by the host.
    RemoteStream {
        url: String,
        headers: HashMap<String, String>,
    },
    /// In-memory audio buffer supplied by the caller.
    MemoryBuffer { data: Bytes },
}

impl AudioSource {
    pub fn remote(url: impl Into<String>) -> Self {
        AudioSource::RemoteStream {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }
}

/// Options applied when a resource is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Start the transport as soon as the resource is loaded.
    pub should_play: bool,
    /// How often the resource should push status updates.
    pub progress_update_interval: Duration,
    /// Initial volume (0.0 = muted, 1.0 = unity gain).
    pub initial_volume: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            should_play: true,
            progress_update_interval: Duration::from_millis(500),
            initial_volume: 1.0,
        }
    }
}

/// Metadata the host may surface in media sessions or lock-screen controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackMetadata {
    pub track_id: Option<String>,
    pub title: Option<String>,
}

/// Everything an adapter needs to create one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub source: AudioSource,
    pub options: PlaybackOptions,
    pub metadata: PlaybackMetadata,
}

impl PlaybackRequest {
    pub fn new(source: AudioSource) -> Self {
        Self {
            source,
            options: PlaybackOptions::default(),
            metadata: PlaybackMetadata::default(),
        }
    }

    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_metadata(mut self, metadata: PlaybackMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Opaque identifier of a live resource inside a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One status push from a live resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub position_ms: u64,
    /// Unknown until the host has probed the stream.
    pub duration_ms: Option<u64>,
    pub is_playing: bool,
    /// `false` means the host lost the resource (decode error, interrupted
    /// stream); no further pushes follow.
    pub is_loaded: bool,
    /// Set once, on the update that reports the natural end of the stream.
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// A loaded resource at `position_ms`.
    pub fn loaded(position_ms: u64, duration_ms: Option<u64>, is_playing: bool) -> Self {
        Self {
            position_ms,
            duration_ms,
            is_playing,
            is_loaded: true,
            did_just_finish: false,
        }
    }

    /// The final update of a resource that played to the end.
    pub fn finished(duration_ms: u64) -> Self {
        Self {
            position_ms: duration_ms,
            duration_ms: Some(duration_ms),
            is_playing: false,
            is_loaded: true,
            did_just_finish: true,
        }
    }
}

/// Receiver of status pushes for a single resource.
///
/// Called from whatever thread the host engine reports on; implementations
/// must not block.
pub trait PlaybackStatusListener: Send + Sync {
    fn on_status(&self, status: PlaybackStatus);
}

impl<F> PlaybackStatusListener for F
where
    F: Fn(PlaybackStatus) + Send + Sync,
{
    fn on_status(&self, status: PlaybackStatus) {
        self(status)
    }
}

/// Host audio engine.
///
/// A resource exists from a successful [`load`](PlaybackAdapter::load) until
/// [`unload`](PlaybackAdapter::unload) returns. After `unload` the adapter
/// must not invoke that resource's listener again.
#[async_trait::async_trait]
pub trait PlaybackAdapter: Send + Sync {
    /// Create a resource for `request.source`, register `listener` for its
    /// status pushes, and start the transport when `options.should_play` is set.
    ///
    /// Network and decode failures surface here.
    ///
    /// The future need not be cancel-safe. Callers bound it with a deadline by
    /// running it on its own task and, when the deadline passes, still await
    /// the result and `stop` + `unload` any handle it yields.
    async fn load(
        &self,
        request: PlaybackRequest,
        listener: std::sync::Arc<dyn PlaybackStatusListener>,
    ) -> Result<HandleId>;

    /// Start or resume the transport.
    async fn play(&self, handle: HandleId) -> Result<()>;

    /// Pause the transport, keeping the resource loaded.
    async fn pause(&self, handle: HandleId) -> Result<()>;

    /// Stop the transport and rewind.
    async fn stop(&self, handle: HandleId) -> Result<()>;

    /// Release every resource held for `handle`.
    async fn unload(&self, handle: HandleId) -> Result<()>;
}
