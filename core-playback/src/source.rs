//! Mapping tracks to byte sources the host adapter can open.

use crate::error::{PlaybackError, Result};
use crate::track::Track;
use async_trait::async_trait;
use bridge_traits::playback::AudioSource;
use std::collections::HashMap;
use url::Url;

/// Produces the byte source a track should be loaded from.
#[async_trait]
pub trait AudioSourceResolver: Send + Sync {
    async fn resolve(&self, track: &Track) -> Result<AudioSource>;
}

/// Streams tracks from the backend's `/api/audio/play/{filename}` route.
#[derive(Debug, Clone)]
pub struct HttpAudioSourceResolver {
    base: Url,
    headers: HashMap<String, String>,
}

impl HttpAudioSourceResolver {
    /// `base_url` is the backend root, e.g. `http://10.0.2.2:5000`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| PlaybackError::SourceError(format!("invalid base URL '{}': {}", base_url, e)))?;
        Self::from_url(base)
    }

    pub fn from_url(base: Url) -> Result<Self> {
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(PlaybackError::SourceError(format!(
                "base URL must be an http(s) URL, got '{}'",
                base
            )));
        }
        Ok(Self {
            base,
            headers: HashMap::new(),
        })
    }

    /// Adds a header sent with every stream request.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Stream URL for `track_id`; the id is encoded as a single path segment.
    pub fn stream_url(&self, track_id: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| PlaybackError::SourceError(format!("'{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(["api", "audio", "play", track_id]);
        Ok(url)
    }
}

#[async_trait]
impl AudioSourceResolver for HttpAudioSourceResolver {
    async fn resolve(&self, track: &Track) -> Result<AudioSource> {
        if !track.is_playable() {
            return Err(PlaybackError::InvalidTrack(track.id.clone()));
        }
        Ok(AudioSource::RemoteStream {
            url: self.stream_url(&track.id)?.into(),
            headers: self.headers.clone(),
        })
    }
}
