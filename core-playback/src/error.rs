//! # Playback Error Types
//!
//! Errors produced while turning a track into a live audio resource. The
//! session never returns these to UI callers; it logs them, publishes a
//! `PlaybackEvent::Error` and falls back to idle.

use bridge_traits::BridgeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Track has no usable identifier.
    #[error("Track is not playable: {0}")]
    InvalidTrack(String),

    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The byte source for a track could not be built.
    #[error("Failed to resolve audio source: {0}")]
    SourceError(String),

    /// Audio source is unavailable (network down, file removed).
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// The host adapter rejected or failed the request.
    #[error("Playback adapter error: {0}")]
    Adapter(#[from] BridgeError),

    /// Creating the resource took longer than the configured bound.
    #[error("Timed out after {0:?} while loading audio")]
    LoadTimeout(Duration),

    /// A live resource reported that it is no longer loaded.
    #[error("Audio resource lost: {0}")]
    ResourceLost(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if calling `play` again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::SourceUnavailable(_)
            | PlaybackError::LoadTimeout(_)
            | PlaybackError::ResourceLost(_) => true,
            PlaybackError::Adapter(bridge) => bridge.is_network(),
            _ => false,
        }
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        match self {
            PlaybackError::SourceUnavailable(_) | PlaybackError::LoadTimeout(_) => true,
            PlaybackError::Adapter(bridge) => bridge.is_network(),
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
