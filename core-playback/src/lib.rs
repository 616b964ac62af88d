//! # Playback Session
//!
//! Coordinates a single shared audio session for every screen of the app.
//!
//! ## Overview
//!
//! This crate handles:
//! - Track identity and resolution of a track to a streamable source
//! - Driving the host [`PlaybackAdapter`](bridge_traits::PlaybackAdapter)
//!   through load, pause, resume, stop and release
//! - The one-resource-at-a-time invariant and serialization of overlapping
//!   requests
//! - Publishing an observable [`PlaybackSnapshot`] and playback events
//!
//! ## Usage
//!
//! ```ignore
//! let session = PlaybackSession::new(adapter, resolver, config.playback, events)?;
//! session.play(&Track::from_filename("a.mp3")).await; // starts
//! session.play(&Track::from_filename("a.mp3")).await; // pauses
//! session.play(&Track::from_filename("b.mp3")).await; // releases a, starts b
//! ```

pub mod error;
pub mod session;
pub mod source;
pub mod state;
pub mod status;
pub mod track;

pub use error::{PlaybackError, Result};
pub use session::PlaybackSession;
pub use source::{AudioSourceResolver, HttpAudioSourceResolver};
pub use state::{PlayOutcome, PlaybackPhase, PlaybackSnapshot};
pub use track::Track;
