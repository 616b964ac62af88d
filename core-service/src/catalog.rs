//! Audio catalog and recommendation client.
//!
//! Read-only views over the backend: the stored audio files that can be
//! streamed, the similarity recommendations for a song title, and the
//! mood-based songs for a face photo. Ranking is done server-side; results
//! are passed through in backend order.

use crate::api::{backend_error, endpoint};
use crate::error::{CoreError, Result};
use crate::types::{
    AudioFile, FaceScan, MoodRecommendations, RecommendBody, Recommendations, ScanFaceBody,
};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_playback::Track;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: Url) -> Self {
        Self {
            http_client,
            base_url,
        }
    }

    /// Lists every stored audio file.
    ///
    /// The backend answers 404 when the store is empty; that is returned as
    /// an empty list.
    #[instrument(skip(self))]
    pub async fn list_files(&self) -> Result<Vec<AudioFile>> {
        let url = endpoint(&self.base_url, &["api", "audio", "files"])?;
        let request = HttpRequest::new(HttpMethod::Get, url.as_str());
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::default())
            .await?;

        if response.status == 404 {
            debug!("Audio store is empty");
            return Ok(Vec::new());
        }
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(status = response.status, error = %err, "Failed to list audio files");
            return Err(err);
        }

        let files: Vec<AudioFile> = response.json()?;
        info!("Retrieved {} audio files", files.len());
        Ok(files)
    }

    /// Lists stored audio as playable tracks.
    pub async fn list_tracks(&self) -> Result<Vec<Track>> {
        let files = self.list_files().await?;
        Ok(files.iter().map(AudioFile::track).collect())
    }

    /// Asks the recommender for songs similar to `song_title`.
    #[instrument(skip(self))]
    pub async fn recommend(&self, song_title: &str) -> Result<Recommendations> {
        let song_title = song_title.trim();
        if song_title.is_empty() {
            return Err(CoreError::InvalidInput(
                "Song title is required for recommendations".to_string(),
            ));
        }

        let mut url = endpoint(&self.base_url, &["recommend"])?;
        url.query_pairs_mut().append_pair("song", song_title);

        let response = self
            .http_client
            .execute(HttpRequest::new(HttpMethod::Get, url.as_str()))
            .await?;
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(status = response.status, error = %err, "Recommendation request failed");
            return Err(err);
        }

        match response.json::<RecommendBody>()? {
            RecommendBody::Success(recommendations) => {
                debug!(
                    matched = %recommendations.searched_song.title,
                    count = recommendations.recommendations.len(),
                    "Received recommendations"
                );
                Ok(recommendations)
            }
            RecommendBody::Failure { error } => {
                warn!(error = %error, "Recommender reported an error");
                Err(CoreError::Backend {
                    status: response.status,
                    message: error,
                })
            }
        }
    }

    /// Sends a base64-encoded face photo and returns the detected mood with
    /// songs ranked for it.
    #[instrument(skip(self, image_base64), fields(image_len = image_base64.len()))]
    pub async fn scan_face(&self, image_base64: &str) -> Result<MoodRecommendations> {
        let image = image_base64.trim();
        if image.is_empty() {
            return Err(CoreError::InvalidInput(
                "A face photo is required for mood recommendations".to_string(),
            ));
        }

        let url = endpoint(&self.base_url, &["api", "scan-face"])?;
        let request = HttpRequest::new(HttpMethod::Post, url.as_str()).json(&FaceScan { image })?;

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            let err = backend_error(&response);
            warn!(status = response.status, error = %err, "Face scan rejected");
            return Err(err);
        }

        match response.json::<ScanFaceBody>()? {
            ScanFaceBody::Success(mood) => {
                debug!(emotion = %mood.emotion, count = mood.songs.len(), "Received mood songs");
                Ok(mood)
            }
            ScanFaceBody::Failure { error } => {
                warn!(error = %error, "Face scan reported an error");
                Err(CoreError::Backend {
                    status: response.status,
                    message: error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait::async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse>;
            async fn execute_with_retry(
                &self,
                request: HttpRequest,
                policy: RetryPolicy,
            ) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn respond(status: u16, body: &str) -> bridge_traits::error::Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        })
    }

    fn client(mock: MockHttpClient) -> CatalogClient {
        CatalogClient::new(Arc::new(mock), Url::parse("http://10.0.2.2:3000").unwrap())
    }

    #[core_async::test]
    async fn list_tracks_maps_filenames() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .withf(|req, _| {
                req.method == HttpMethod::Get && req.url == "http://10.0.2.2:3000/api/audio/files"
            })
            .times(1)
            .returning(|_, _| {
                respond(
                    200,
                    r#"[
                        { "filename": "Kesariya.mp3", "length": 10, "contentType": "audio/mpeg" },
                        { "filename": "Bholi.mp3", "length": 20 }
                    ]"#,
                )
            });

        let tracks = client(mock_http).list_tracks().await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].id, "Kesariya.mp3");
        assert_eq!(tracks[0].title, "Kesariya");
        assert_eq!(tracks[1].id, "Bholi.mp3");
    }

    #[core_async::test]
    async fn empty_store_is_empty_list() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .returning(|_, _| respond(404, r#"{ "message": "No audio files found" }"#));

        assert!(client(mock_http).list_files().await.unwrap().is_empty());
    }

    #[core_async::test]
    async fn listing_surfaces_server_errors() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .returning(|_, _| respond(503, r#"{ "message": "GridFS not ready yet" }"#));

        let err = client(mock_http).list_files().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Backend { status: 503, ref message } if message == "GridFS not ready yet"
        ));
    }

    #[core_async::test]
    async fn listing_propagates_transport_failure() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute_with_retry()
            .returning(|_, _| Err(bridge_traits::BridgeError::Network("refused".into())));

        let err = client(mock_http).list_files().await.unwrap_err();
        assert!(err.is_network_error());
    }

    #[core_async::test]
    async fn recommend_encodes_query() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| req.url == "http://10.0.2.2:3000/recommend?song=Tum+Hi+Ho")
            .times(1)
            .returning(|_| {
                respond(
                    200,
                    r#"{
                        "searched_song": { "title": "Tum Hi Ho", "filename": "tum_hi_ho.mp3", "language": "hindi" },
                        "recommendations": [
                            { "title": "Kesariya", "filename": "Kesariya.mp3", "language": "hindi", "similarity": 0.91 },
                            { "title": "Bholi", "filename": "Bholi.mp3", "similarity": 0.84 }
                        ]
                    }"#,
                )
            });

        let recs = client(mock_http).recommend(" Tum Hi Ho ").await.unwrap();

        assert_eq!(recs.searched_song.filename, "tum_hi_ho.mp3");
        let titles: Vec<_> = recs.recommendations.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Kesariya", "Bholi"]);
        assert_eq!(recs.recommendations[1].language, "");
    }

    #[core_async::test]
    async fn recommend_error_body_is_backend_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(200, r#"{ "error": "No song found with title: 'zzz'" }"#));

        let err = client(mock_http).recommend("zzz").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Backend { status: 200, ref message } if message.contains("No song found")
        ));
    }

    #[core_async::test]
    async fn recommend_rejects_blank_title() {
        let mock_http = MockHttpClient::new();

        let err = client(mock_http).recommend("   ").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[core_async::test]
    async fn scan_face_posts_image() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Post
                    && req.url == "http://10.0.2.2:3000/api/scan-face"
                    && req.body.as_deref() == Some(br#"{"image":"aGVsbG8="}"#.as_slice())
            })
            .times(1)
            .returning(|_| {
                respond(
                    200,
                    r#"{
                        "emotion": "happy",
                        "songs": [
                            { "title": "Kesariya", "score": 0.812 },
                            { "title": "Bholi", "score": 0.64 }
                        ]
                    }"#,
                )
            });

        let mood = client(mock_http).scan_face("aGVsbG8=").await.unwrap();

        assert_eq!(mood.emotion, "happy");
        let titles: Vec<_> = mood.songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Kesariya", "Bholi"]);
        assert!((mood.songs[0].score - 0.812).abs() < f64::EPSILON);
    }

    #[core_async::test]
    async fn scan_face_without_face_is_neutral() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(200, r#"{ "emotion": "neutral", "songs": [] }"#));

        let mood = client(mock_http).scan_face("aGVsbG8=").await.unwrap();

        assert_eq!(mood.emotion, "neutral");
        assert!(mood.songs.is_empty());
    }

    #[core_async::test]
    async fn scan_face_error_body_is_backend_error() {
        let mut mock_http = MockHttpClient::new();
        mock_http
            .expect_execute()
            .returning(|_| respond(400, r#"{ "error": "Invalid image" }"#));

        let err = client(mock_http).scan_face("not-an-image").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Backend { status: 400, ref message } if message == "Invalid image"
        ));
    }

    #[core_async::test]
    async fn scan_face_rejects_empty_image() {
        let mock_http = MockHttpClient::new();

        let err = client(mock_http).scan_face("").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
