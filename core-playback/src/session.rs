//! # Playback Session
//!
//! The single coordinator every UI surface plays through.
//!
//! ## Guarantees
//!
//! - At most one resource is live. Switching tracks stops and unloads the old
//!   resource before the new one is created.
//! - Operations are serialized: one async mutex guards the resource slot and
//!   is held for the whole of each operation, including teardown-then-create.
//!   Overlapping calls run one after another in arrival order.
//! - Status pushes are tagged with the generation of the resource that sent
//!   them. Pushes from anything but the live generation are dropped, so a
//!   replaced resource can never overwrite the state of its successor.
//! - Failures never escape. Loading errors reset the session to idle; pause
//!   and resume errors leave it as it was; stop and unload errors are logged
//!   and the slot is cleared anyway.
//! - A load that misses `load_timeout` keeps running on its own task. Any
//!   handle it produces afterwards is stopped and unloaded at once.
//!
//! ## State flow
//!
//! ```text
//! Idle ──play──> Loading ──ok──> Playing <──toggle──> Paused
//!   ^               │                │                  │
//!   └────error──────┘                └──stop / finish───┘──> Idle
//! ```
//!
//! UI surfaces read state through [`PlaybackSession::subscribe`]; transitions
//! are also published on the event bus as `CoreEvent::Playback`.

use crate::error::{PlaybackError, Result};
use crate::source::AudioSourceResolver;
use crate::state::{PlayOutcome, PlaybackPhase, PlaybackSnapshot};
use crate::status::{Generation, GenerationListener, StatusUpdate};
use crate::track::Track;
use bridge_traits::playback::{
    HandleId, PlaybackAdapter, PlaybackMetadata, PlaybackOptions, PlaybackRequest,
};
use core_async::runtime;
use core_async::sync::{mpsc, watch, Mutex};
use core_async::task::{self, AbortHandle};
use core_async::time::timeout;
use core_runtime::config::PlaybackConfig;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, instrument, trace, warn};

struct LiveResource {
    handle: HandleId,
    track: Track,
    generation: Generation,
}

#[derive(Default)]
struct Slot {
    live: Option<LiveResource>,
    last_generation: Generation,
    shut_down: bool,
}

struct SessionInner {
    adapter: Arc<dyn PlaybackAdapter>,
    resolver: Arc<dyn AudioSourceResolver>,
    config: PlaybackConfig,
    events: EventBus,
    slot: Mutex<Slot>,
    state: watch::Sender<PlaybackSnapshot>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    pump: AbortHandle,
}

/// Shared playback coordinator. Cloning is cheap and every clone drives the
/// same session.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<SessionInner>,
}

impl PlaybackSession {
    /// Creates the session and starts its status pump.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Internal`] when called outside an async runtime.
    pub fn new(
        adapter: Arc<dyn PlaybackAdapter>,
        resolver: Arc<dyn AudioSourceResolver>,
        config: PlaybackConfig,
        events: EventBus,
    ) -> Result<Self> {
        if !runtime::in_runtime() {
            return Err(PlaybackError::Internal(
                "PlaybackSession must be created inside an async runtime".to_string(),
            ));
        }

        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(PlaybackSnapshot::idle());

        let inner = Arc::new_cyclic(|weak: &Weak<SessionInner>| {
            let pump = task::spawn(run_status_pump(weak.clone(), status_rx));
            SessionInner {
                adapter,
                resolver,
                config,
                events,
                slot: Mutex::new(Slot::default()),
                state,
                status_tx,
                pump: pump.abort_handle(),
            }
        });

        debug!(load_timeout_ms = config.load_timeout.as_millis() as u64, "Playback session created");
        Ok(Self { inner })
    }

    /// Plays `track`, or toggles it if it is already the loaded track.
    ///
    /// - same track, playing: pause in place
    /// - same track, paused: resume in place
    /// - anything else: release the current resource, then create one for
    ///   `track` with auto-start
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn play(&self, track: &Track) -> PlayOutcome {
        if !track.is_playable() {
            warn!("Ignoring play request for track without an id");
            return PlayOutcome::Ignored;
        }

        let mut slot = self.inner.slot.lock().await;
        if slot.shut_down {
            warn!("Ignoring play request after shutdown");
            return PlayOutcome::Ignored;
        }

        let same_track = slot
            .live
            .as_ref()
            .is_some_and(|live| live.track.id == track.id);

        if same_track {
            return if self.inner.snapshot().is_playing {
                self.inner.pause_locked(&slot).await
            } else {
                self.inner.resume_locked(&slot).await
            };
        }

        if let Some(previous) = slot.live.take() {
            self.inner.release(&previous).await;
            self.inner.emit(PlaybackEvent::Stopped {
                track_id: previous.track.id,
            });
        }

        self.inner.load_locked(&mut slot, track).await
    }

    /// Pauses the live resource. No-op when nothing is playing.
    pub async fn pause(&self) {
        let slot = self.inner.slot.lock().await;
        self.inner.pause_locked(&slot).await;
    }

    /// Resumes the live resource. No-op when nothing is loaded or it is
    /// already playing.
    pub async fn resume(&self) {
        let slot = self.inner.slot.lock().await;
        self.inner.resume_locked(&slot).await;
    }

    /// Stops and releases the live resource and clears all state.
    ///
    /// Idempotent. When this returns the slot is free.
    pub async fn stop(&self) {
        let mut slot = self.inner.slot.lock().await;
        self.inner.stop_locked(&mut slot).await;
    }

    /// Stops playback and detaches from status pushes for good. Later `play`
    /// calls are ignored.
    pub async fn shutdown(&self) {
        let mut slot = self.inner.slot.lock().await;
        self.inner.stop_locked(&mut slot).await;
        slot.shut_down = true;
        self.inner.pump.abort();
        info!("Playback session shut down");
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.snapshot()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.inner.state.borrow().phase
    }

    pub fn current_track_id(&self) -> Option<String> {
        self.inner.state.borrow().current_track_id.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.borrow().is_playing
    }

    pub fn position_ms(&self) -> u64 {
        self.inner.state.borrow().position_ms
    }

    pub fn duration_ms(&self) -> u64 {
        self.inner.state.borrow().duration_ms
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("state", &*self.inner.state.borrow())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl SessionInner {
    fn snapshot(&self) -> PlaybackSnapshot {
        self.state.borrow().clone()
    }

    /// Replaces the snapshot, notifying subscribers only on change.
    fn publish(&self, next: PlaybackSnapshot) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine.
        let _ = self.events.emit(CoreEvent::Playback(event));
    }

    /// Stop then unload. Failures are logged; the caller drops the resource
    /// either way.
    async fn release(&self, live: &LiveResource) {
        if let Err(err) = self.adapter.stop(live.handle).await {
            warn!(track_id = %live.track.id, handle = %live.handle, error = %err, "Failed to stop resource");
        }
        if let Err(err) = self.adapter.unload(live.handle).await {
            warn!(track_id = %live.track.id, handle = %live.handle, error = %err, "Failed to unload resource");
        }
        debug!(track_id = %live.track.id, generation = live.generation, "Resource released");
    }

    async fn stop_locked(&self, slot: &mut Slot) {
        if let Some(live) = slot.live.take() {
            self.release(&live).await;
            info!(track_id = %live.track.id, "Playback stopped");
            self.emit(PlaybackEvent::Stopped {
                track_id: live.track.id,
            });
        }
        self.publish(PlaybackSnapshot::idle());
    }

    async fn pause_locked(&self, slot: &Slot) -> PlayOutcome {
        let Some(live) = slot.live.as_ref() else {
            return PlayOutcome::Ignored;
        };
        if !self.state.borrow().is_playing {
            return PlayOutcome::Ignored;
        }

        match self.adapter.pause(live.handle).await {
            Ok(()) => {
                let mut position_ms = 0;
                self.state.send_modify(|s| {
                    s.is_playing = false;
                    s.phase = PlaybackPhase::Paused;
                    position_ms = s.position_ms;
                });
                debug!(track_id = %live.track.id, position_ms, "Paused");
                self.emit(PlaybackEvent::Paused {
                    track_id: live.track.id.clone(),
                    position_ms,
                });
                PlayOutcome::Paused
            }
            Err(err) => {
                warn!(track_id = %live.track.id, error = %err, "Pause failed; state unchanged");
                PlayOutcome::Failed
            }
        }
    }

    async fn resume_locked(&self, slot: &Slot) -> PlayOutcome {
        let Some(live) = slot.live.as_ref() else {
            return PlayOutcome::Ignored;
        };
        if self.state.borrow().is_playing {
            return PlayOutcome::Ignored;
        }

        match self.adapter.play(live.handle).await {
            Ok(()) => {
                let mut position_ms = 0;
                self.state.send_modify(|s| {
                    s.is_playing = true;
                    s.phase = PlaybackPhase::Playing;
                    position_ms = s.position_ms;
                });
                debug!(track_id = %live.track.id, position_ms, "Resumed");
                self.emit(PlaybackEvent::Resumed {
                    track_id: live.track.id.clone(),
                    position_ms,
                });
                PlayOutcome::Resumed
            }
            Err(err) => {
                warn!(track_id = %live.track.id, error = %err, "Resume failed; state unchanged");
                PlayOutcome::Failed
            }
        }
    }

    /// Creates a resource for `track` in an empty slot.
    async fn load_locked(&self, slot: &mut Slot, track: &Track) -> PlayOutcome {
        debug_assert!(slot.live.is_none());

        slot.last_generation += 1;
        let generation = slot.last_generation;

        self.publish(PlaybackSnapshot::loading(&track.id));
        self.emit(PlaybackEvent::Loading {
            track_id: track.id.clone(),
        });
        debug!(track_id = %track.id, generation, "Loading track");

        match self.create_resource(track, generation).await {
            Ok(handle) => {
                slot.live = Some(LiveResource {
                    handle,
                    track: track.clone(),
                    generation,
                });
                self.publish(PlaybackSnapshot::started(&track.id));
                info!(track_id = %track.id, generation, "Playback started");
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.clone(),
                    title: track.title.clone(),
                });
                PlayOutcome::Started
            }
            Err(err) => {
                error!(track_id = %track.id, generation, error = %err, "Failed to load track");
                self.publish(PlaybackSnapshot::idle());
                self.emit(PlaybackEvent::Error {
                    track_id: Some(track.id.clone()),
                    message: err.to_string(),
                    recoverable: err.is_transient(),
                });
                PlayOutcome::Failed
            }
        }
    }

    /// Resolves and loads `track` on its own task, bounded by `load_timeout`.
    ///
    /// The load keeps running past the deadline. If it still yields a handle,
    /// [`release_orphan`] stops and unloads it so the host never holds a
    /// second resource. Its status pushes carry a generation that is never
    /// made live, so the pump drops them.
    async fn create_resource(&self, track: &Track, generation: Generation) -> Result<HandleId> {
        let adapter = Arc::clone(&self.adapter);
        let resolver = Arc::clone(&self.resolver);
        let listener = Arc::new(GenerationListener::new(generation, self.status_tx.clone()));
        let options = PlaybackOptions {
            should_play: true,
            progress_update_interval: self.config.progress_update_interval,
            initial_volume: self.config.initial_volume,
        };
        let requested = track.clone();

        let mut load = task::spawn(async move {
            let source = resolver.resolve(&requested).await?;
            let request = PlaybackRequest::new(source)
                .with_options(options)
                .with_metadata(PlaybackMetadata {
                    track_id: Some(requested.id.clone()),
                    title: Some(requested.title.clone()),
                });
            Ok::<_, PlaybackError>(adapter.load(request, listener).await?)
        });

        match timeout(self.config.load_timeout, &mut load).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PlaybackError::Internal(format!(
                "Load task failed: {join_err}"
            ))),
            Err(_) => {
                task::spawn(release_orphan(
                    Arc::clone(&self.adapter),
                    load,
                    track.id.clone(),
                    generation,
                ));
                Err(PlaybackError::LoadTimeout(self.config.load_timeout))
            }
        }
    }

    /// Applies one status push if it belongs to the live resource.
    async fn apply_status(&self, update: StatusUpdate) {
        let mut slot = self.slot.lock().await;

        let live_generation = slot.live.as_ref().map(|live| live.generation);
        if live_generation != Some(update.generation) {
            trace!(
                generation = update.generation,
                live = ?live_generation,
                "Dropping status from a replaced resource"
            );
            return;
        }

        let status = update.status;

        if status.did_just_finish || !status.is_loaded {
            let Some(live) = slot.live.take() else {
                return;
            };
            self.release(&live).await;
            self.publish(PlaybackSnapshot::idle());

            if status.did_just_finish {
                info!(track_id = %live.track.id, "Track finished");
                self.emit(PlaybackEvent::Completed {
                    track_id: live.track.id,
                });
            } else {
                let err = PlaybackError::ResourceLost(format!(
                    "'{}' reported it is no longer loaded",
                    live.track.id
                ));
                warn!(track_id = %live.track.id, error = %err, "Resource lost");
                self.emit(PlaybackEvent::Error {
                    track_id: Some(live.track.id),
                    message: err.to_string(),
                    recoverable: err.is_transient(),
                });
            }
            return;
        }

        let Some(live) = slot.live.as_ref() else {
            return;
        };

        let mut position_changed = false;
        let mut duration_ms = 0;
        self.state.send_if_modified(|s| {
            let before = s.clone();
            s.position_ms = status.position_ms;
            s.duration_ms = status.duration_ms.unwrap_or(s.duration_ms);
            s.is_playing = status.is_playing;
            s.phase = if status.is_playing {
                PlaybackPhase::Playing
            } else {
                PlaybackPhase::Paused
            };
            position_changed = before.position_ms != s.position_ms;
            duration_ms = s.duration_ms;
            *s != before
        });

        if position_changed {
            self.emit(PlaybackEvent::PositionChanged {
                track_id: live.track.id.clone(),
                position_ms: status.position_ms,
                duration_ms,
            });
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Waits out a load that missed its deadline and releases whatever it made.
async fn release_orphan(
    adapter: Arc<dyn PlaybackAdapter>,
    load: task::JoinHandle<Result<HandleId>>,
    track_id: String,
    generation: Generation,
) {
    let handle = match load.await {
        Ok(Ok(handle)) => handle,
        Ok(Err(err)) => {
            debug!(%track_id, generation, error = %err, "Timed-out load failed late");
            return;
        }
        Err(err) => {
            warn!(%track_id, generation, error = %err, "Timed-out load task aborted");
            return;
        }
    };

    warn!(%track_id, generation, handle = %handle, "Releasing resource created after load timeout");
    if let Err(err) = adapter.stop(handle).await {
        warn!(%track_id, error = %err, "Failed to stop late resource");
    }
    if let Err(err) = adapter.unload(handle).await {
        warn!(%track_id, error = %err, "Failed to unload late resource");
    }
}

/// Drains status pushes until the session goes away.
async fn run_status_pump(
    session: Weak<SessionInner>,
    mut updates: mpsc::UnboundedReceiver<StatusUpdate>,
) {
    while let Some(update) = updates.recv().await {
        let Some(inner) = session.upgrade() else {
            break;
        };
        inner.apply_status(update).await;
    }
    debug!("Status pump stopped");
}
