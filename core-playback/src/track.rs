//! Track identity as seen by the playback session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A playable audio item.
///
/// Identity is the `id` alone (the backing filename on the audio server);
/// two tracks with the same id are the same track to the session, whatever
/// their titles say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Builds a track from a stored filename, using the name without its
    /// extension as the title.
    pub fn from_filename(filename: impl Into<String>) -> Self {
        let id = filename.into();
        let title = match id.rfind('.') {
            Some(dot) if dot > 0 => id[..dot].to_string(),
            _ => id.clone(),
        };
        Self { id, title }
    }

    /// A track without a non-blank id cannot be requested from the server.
    pub fn is_playable(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl std::hash::Hash for Track {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
