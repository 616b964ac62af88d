//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridges (playback adapter, HTTP client,
//! settings store) into the shared Rust core and hands out the single
//! [`PlaybackSession`] every screen plays through. Desktop apps typically
//! enable the `desktop-shims` feature (which depends on `bridge-desktop`) and
//! call [`bootstrap_desktop`]; mobile hosts build a [`CoreConfig`] with their
//! native bridges and call [`CoreService::new`].

pub mod account;
mod api;
pub mod catalog;
pub mod error;
pub mod types;

pub use account::{AccountService, USER_KEY};
pub use catalog::CatalogClient;
pub use error::{CoreError, Result};
pub use types::{
    AudioFile, MoodRecommendations, MoodSong, RecommendedSong, Recommendations, SongSummary, User,
};

pub use core_playback::{PlayOutcome, PlaybackPhase, PlaybackSession, PlaybackSnapshot, Track};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::events::{EventBus, EventStream};

use core_playback::HttpAudioSourceResolver;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; clones share the session, event bus and services.
#[derive(Clone)]
pub struct CoreService {
    config: Arc<CoreConfig>,
    events: EventBus,
    session: PlaybackSession,
    catalog: Arc<CatalogClient>,
    account: Arc<AccountService>,
}

impl CoreService {
    /// Create the service from a built configuration.
    ///
    /// Must be called inside an async runtime; the playback session spawns
    /// its status pump here.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let events = EventBus::new(config.event_buffer_size);
        let resolver = HttpAudioSourceResolver::from_url(config.api_base_url.clone())?;
        let session = PlaybackSession::new(
            config.playback_adapter.clone(),
            Arc::new(resolver),
            config.playback,
            events.clone(),
        )?;

        let catalog = CatalogClient::new(config.http_client.clone(), config.api_base_url.clone());
        let account = AccountService::new(
            config.http_client.clone(),
            config.settings_store.clone(),
            config.api_base_url.clone(),
            events.clone(),
            session.clone(),
        );

        info!(api_base_url = %config.api_base_url, "Core service initialized");

        Ok(Self {
            config: Arc::new(config),
            events,
            session,
            catalog: Arc::new(catalog),
            account: Arc::new(account),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// New stream over every core event from this point on.
    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// The shared playback session.
    pub fn playback(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn account(&self) -> &AccountService {
        &self.account
    }

    /// Hook for the host's sign-in screen: entering it stops playback.
    pub async fn on_auth_screen_entered(&self) {
        self.session.stop().await;
    }

    /// Stops playback and detaches from the host adapter.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
        info!("Core service shut down");
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Opens (or creates) the SQLite settings database at `settings_db_path`,
/// uses the reqwest HTTP client, and plays through `adapter`.
///
/// ```ignore
/// let core = core_service::bootstrap_desktop(
///     "http://localhost:3000",
///     "/home/asha/.local/share/aatmabeat/settings.db",
///     adapter,
/// )
/// .await?;
/// core.playback().play(&Track::from_filename("Kesariya.mp3")).await;
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    base_url: &str,
    settings_db_path: impl Into<std::path::PathBuf>,
    adapter: Arc<dyn bridge_traits::PlaybackAdapter>,
) -> Result<CoreService> {
    use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};

    let settings = SqliteSettingsStore::new(settings_db_path.into())
        .await
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let http_client = ReqwestHttpClient::new()?;

    let config = CoreConfig::builder()
        .api_base_url(base_url)
        .playback_adapter(adapter)
        .settings_store(Arc::new(settings))
        .http_client(Arc::new(http_client))
        .build()?;

    CoreService::new(config)
}
