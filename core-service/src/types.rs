//! Backend response types
//!
//! Data structures for the JSON bodies of the audio, recommendation,
//! face-scan and account endpoints.

use chrono::{DateTime, Utc};
use core_playback::Track;
use serde::{Deserialize, Serialize};

/// One stored audio file from `GET /api/audio/files`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    /// Stored filename, also the track id used for streaming.
    pub filename: String,

    /// Size in bytes
    #[serde(default)]
    pub length: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl AudioFile {
    pub fn track(&self) -> Track {
        Track::from_filename(self.filename.clone())
    }
}

/// The song a recommendation query matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongSummary {
    pub title: String,
    pub filename: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedSong {
    pub title: String,
    pub filename: String,
    #[serde(default)]
    pub language: String,
    /// Higher is closer; ranking is the backend's business.
    pub similarity: f64,
}

impl RecommendedSong {
    pub fn track(&self) -> Track {
        Track::new(self.filename.clone(), self.title.clone())
    }
}

/// Ranked neighbours of a searched song, in backend order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    pub searched_song: SongSummary,
    pub recommendations: Vec<RecommendedSong>,
}

/// The recommender reports failures as `{ "error": ... }`, sometimes with a
/// 200 status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecommendBody {
    Failure { error: String },
    Success(Recommendations),
}

/// One song ranked for a detected mood.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodSong {
    pub title: String,
    /// Probability the song suits the mood, rounded to three places.
    pub score: f64,
}

/// Result of `POST /api/scan-face`. A photo with no detectable face comes
/// back as `neutral` with no songs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodRecommendations {
    pub emotion: String,
    #[serde(default)]
    pub songs: Vec<MoodSong>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScanFaceBody {
    Failure { error: String },
    Success(MoodRecommendations),
}

#[derive(Debug, Serialize)]
pub(crate) struct FaceScan<'a> {
    pub image: &'a str,
}

/// The signed-in user as persisted under the `user` settings key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

fn default_name() -> String {
    "User".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignInResponse {
    pub user: User,
}

/// Generic `{ message }` / `{ error }` body carried by most responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiMessage {
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileUpdate<'a> {
    pub name: &'a str,
    pub bio: &'a str,
}
