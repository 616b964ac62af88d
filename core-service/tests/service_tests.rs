//! Integration tests for the core service façade.
//!
//! This test suite verifies:
//! - Wiring of one shared playback session into every service
//! - Stopping playback when the auth screen is entered
//! - Configuration failures surfacing as `CoreError::Config`
//! - Desktop bootstrap against a file-backed settings store

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::playback::{
    HandleId, PlaybackAdapter, PlaybackRequest, PlaybackStatusListener,
};
use bridge_traits::storage::SettingsStore;
use bytes::Bytes;
use core_runtime::events::{CoreEvent, PlaybackEvent};
use core_service::{CoreConfig, CoreError, CoreService, PlayOutcome, PlaybackPhase, Track};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct CountingAdapter {
    loads: Mutex<Vec<String>>,
}

#[async_trait]
impl PlaybackAdapter for CountingAdapter {
    async fn load(
        &self,
        request: PlaybackRequest,
        _listener: Arc<dyn PlaybackStatusListener>,
    ) -> BridgeResult<HandleId> {
        self.loads
            .lock()
            .unwrap()
            .push(request.metadata.track_id.unwrap_or_default());
        Ok(HandleId::new())
    }

    async fn play(&self, _handle: HandleId) -> BridgeResult<()> {
        Ok(())
    }

    async fn pause(&self, _handle: HandleId) -> BridgeResult<()> {
        Ok(())
    }

    async fn stop(&self, _handle: HandleId) -> BridgeResult<()> {
        Ok(())
    }

    async fn unload(&self, _handle: HandleId) -> BridgeResult<()> {
        Ok(())
    }
}

/// Answers every request with the same canned listing.
struct CannedHttp;

#[async_trait]
impl HttpClient for CannedHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from_static(br#"[{ "filename": "Kesariya.mp3" }, { "filename": "Bholi.mp3" }]"#),
        })
    }
}

#[derive(Default)]
struct MemoryStore(Mutex<HashMap<String, String>>);

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.0.lock().unwrap().insert(key.into(), value.into());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.0.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(self.0.lock().unwrap().keys().cloned().collect())
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        self.0.lock().unwrap().clear();
        Ok(())
    }
}

fn service(adapter: Arc<CountingAdapter>) -> CoreService {
    let config = CoreConfig::builder()
        .api_base_url("http://10.0.2.2:3000")
        .playback_adapter(adapter)
        .settings_store(Arc::new(MemoryStore::default()))
        .http_client(Arc::new(CannedHttp))
        .build()
        .unwrap();
    CoreService::new(config).unwrap()
}

#[core_async::test]
async fn catalog_tracks_play_through_shared_session() {
    let adapter = Arc::new(CountingAdapter::default());
    let core = service(adapter.clone());
    let mut events = core.subscribe_events();

    let tracks = core.catalog().list_tracks().await.unwrap();
    assert_eq!(tracks.len(), 2);

    let other_screen = core.clone();
    assert_eq!(core.playback().play(&tracks[0]).await, PlayOutcome::Started);
    assert_eq!(
        other_screen.playback().current_track_id().as_deref(),
        Some("Kesariya.mp3")
    );
    assert_eq!(
        other_screen.playback().play(&tracks[1]).await,
        PlayOutcome::Started
    );

    assert_eq!(
        *adapter.loads.lock().unwrap(),
        vec!["Kesariya.mp3".to_string(), "Bholi.mp3".to_string()]
    );

    let mut saw_started = false;
    while let Some(Ok(event)) = events.try_recv() {
        if let CoreEvent::Playback(PlaybackEvent::Started { track_id, .. }) = event {
            saw_started |= track_id == "Kesariya.mp3";
        }
    }
    assert!(saw_started);
}

#[core_async::test]
async fn entering_auth_screen_stops_playback() {
    let core = service(Arc::new(CountingAdapter::default()));

    core.playback().play(&Track::from_filename("a.mp3")).await;
    core.on_auth_screen_entered().await;

    assert_eq!(core.playback().phase(), PlaybackPhase::Idle);
    assert!(core.playback().current_track_id().is_none());
}

#[core_async::test]
async fn shutdown_ignores_later_plays() {
    let core = service(Arc::new(CountingAdapter::default()));

    core.shutdown().await;

    assert_eq!(
        core.playback().play(&Track::from_filename("a.mp3")).await,
        PlayOutcome::Ignored
    );
}

#[test]
fn missing_adapter_is_config_error() {
    let result = CoreConfig::builder()
        .api_base_url("http://10.0.2.2:3000")
        .settings_store(Arc::new(MemoryStore::default()))
        .http_client(Arc::new(CannedHttp))
        .build()
        .map_err(CoreError::from);

    assert!(matches!(result, Err(CoreError::Config(_))));
}

#[cfg(feature = "desktop-shims")]
#[core_async::test]
async fn desktop_bootstrap_persists_settings() {
    let dir = std::env::temp_dir().join(format!("aatmabeat-core-{}", std::process::id()));
    let db_path = dir.join("settings.db");

    let core = core_service::bootstrap_desktop(
        "http://localhost:3000",
        db_path.clone(),
        Arc::new(CountingAdapter::default()),
    )
    .await
    .unwrap();

    assert_eq!(core.config().api_base_url.as_str(), "http://localhost:3000/");
    assert!(core.account().current_user().await.unwrap().is_none());
    assert!(db_path.exists());

    core.shutdown().await;
    let _ = std::fs::remove_dir_all(dir);
}

#[cfg(feature = "desktop-shims")]
#[core_async::test]
async fn desktop_bootstrap_rejects_bad_url() {
    let dir = std::env::temp_dir().join(format!("aatmabeat-core-bad-{}", std::process::id()));

    let result = core_service::bootstrap_desktop(
        "not a url",
        dir.join("settings.db"),
        Arc::new(CountingAdapter::default()),
    )
    .await;

    assert!(matches!(result, Err(CoreError::Config(_))));
    let _ = std::fs::remove_dir_all(dir);
}
