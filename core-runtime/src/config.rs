//! # Core Configuration Module
//!
//! Builder-based configuration for the Aatmabeat core.
//!
//! ## Overview
//!
//! [`CoreConfig`] holds the backend location, the host bridges, and the
//! playback tuning knobs. [`CoreConfigBuilder::build`] fails fast when a
//! required bridge is missing or a value is out of range, so a misconfigured
//! host never gets as far as creating a playback session.
//!
//! ## Required Dependencies
//!
//! - `api_base_url` - Backend serving `/api/audio/*`, `/recommend`, `/signin`...
//! - `PlaybackAdapter` - Host audio engine
//! - `SettingsStore` - Key-value storage for the signed-in user
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - desktop default: `ReqwestHttpClient` (`desktop-shims` feature)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("http://10.0.2.2:5000")
//!     .playback_adapter(Arc::new(HostAudioEngine::new()))
//!     .settings_store(Arc::new(AsyncStorageBridge::new()))
//!     .load_timeout(Duration::from_secs(10))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, PlaybackAdapter, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const MIN_LOAD_TIMEOUT: Duration = Duration::from_millis(1);
const MAX_LOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Playback tuning shared by the session and the requests it sends to the
/// host adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Upper bound on creating a resource (network fetch plus decode). A load
    /// that exceeds it is treated as a failed load.
    pub load_timeout: Duration,
    /// Requested interval between status pushes from a live resource.
    pub progress_update_interval: Duration,
    /// Volume new resources start at, `0.0..=1.0`.
    pub initial_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            progress_update_interval: Duration::from_millis(500),
            initial_volume: 1.0,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.load_timeout < MIN_LOAD_TIMEOUT || self.load_timeout > MAX_LOAD_TIMEOUT {
            return Err(Error::Config(format!(
                "Load timeout must be between 1ms and 5 minutes, got {:?}",
                self.load_timeout
            )));
        }

        if self.progress_update_interval.is_zero() {
            return Err(Error::Config(
                "Progress update interval must be greater than 0ms".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::Config(format!(
                "Initial volume must be within 0.0..=1.0, got {}",
                self.initial_volume
            )));
        }

        Ok(())
    }
}

/// Core configuration. Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend root, always http or https.
    pub api_base_url: Url,

    /// Host audio engine (required)
    pub playback_adapter: Arc<dyn PlaybackAdapter>,

    /// Key-value storage for the persisted user (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// HTTP client for backend calls (desktop default available)
    pub http_client: Arc<dyn HttpClient>,

    pub playback: PlaybackConfig,

    /// Capacity of the event bus ring buffer.
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("playback_adapter", &"PlaybackAdapter { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("playback", &self.playback)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates value ranges. Bridges are already checked by the builder.
    pub fn validate(&self) -> Result<()> {
        match self.api_base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(Error::Config(format!(
                    "API base URL must use http or https, got '{}'",
                    other
                )))
            }
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        self.playback.validate()
    }
}

fn playback_adapter_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlaybackAdapter".to_string(),
        message: "PlaybackAdapter implementation is required to create audio resources. \
                 Mobile: inject the native audio engine bridge. \
                 Tests: inject an in-memory fake adapter."
            .to_string(),
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist the signed-in user. \
                 Desktop: use bridge_desktop::SqliteSettingsStore. \
                 Mobile: inject an AsyncStorage/UserDefaults/SharedPreferences bridge."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for backend calls. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject the platform-native HTTP bridge."
            .to_string(),
    })
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    playback_adapter: Option<Arc<dyn PlaybackAdapter>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    playback: PlaybackConfig,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the backend root, e.g. `http://10.0.2.2:5000`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn playback_adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.playback_adapter = Some(adapter);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn playback(mut self, playback: PlaybackConfig) -> Self {
        self.playback = playback;
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.playback.load_timeout = timeout;
        self
    }

    pub fn progress_update_interval(mut self, interval: Duration) -> Self {
        self.playback.progress_update_interval = interval;
        self
    }

    pub fn initial_volume(mut self, volume: f32) -> Self {
        self.playback.initial_volume = volume;
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] for a missing or malformed base URL and for
    ///   out-of-range values
    /// - [`Error::CapabilityMissing`] for a missing required bridge
    pub fn build(self) -> Result<CoreConfig> {
        let raw_url = self.api_base_url.ok_or_else(|| {
            Error::Config(
                "API base URL is required. Use .api_base_url() to set it.".to_string(),
            )
        })?;
        let api_base_url = Url::parse(raw_url.trim())
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw_url, e)))?;

        let playback_adapter = self
            .playback_adapter
            .ok_or_else(playback_adapter_missing_error)?;
        let settings_store = self
            .settings_store
            .ok_or_else(settings_store_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            api_base_url,
            playback_adapter,
            settings_store,
            http_client,
            playback: self.playback,
            event_buffer_size: self.event_buffer_size.unwrap_or(100),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::playback::{HandleId, PlaybackRequest, PlaybackStatusListener};

    struct NullAdapter;

    #[async_trait]
    impl PlaybackAdapter for NullAdapter {
        async fn load(
            &self,
            _request: PlaybackRequest,
            _listener: Arc<dyn PlaybackStatusListener>,
        ) -> BridgeResult<HandleId> {
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

    struct NullSettings;

    #[async_trait]
    impl SettingsStore for NullSettings {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn list_keys(&self) -> BridgeResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullHttp;

    #[async_trait]
    impl HttpClient for NullHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 204,
                headers: Default::default(),
                body: Default::default(),
            })
        }
    }

    fn complete_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .api_base_url("http://10.0.2.2:5000")
            .playback_adapter(Arc::new(NullAdapter))
            .settings_store(Arc::new(NullSettings))
            .http_client(Arc::new(NullHttp))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.api_base_url.as_str(), "http://10.0.2.2:5000/");
        assert_eq!(config.playback, PlaybackConfig::default());
        assert_eq!(config.playback.load_timeout, Duration::from_secs(15));
        assert_eq!(config.event_buffer_size, 100);
    }

    #[test]
    fn test_builder_requires_base_url() {
        let err = CoreConfig::builder()
            .playback_adapter(Arc::new(NullAdapter))
            .settings_store(Arc::new(NullSettings))
            .http_client(Arc::new(NullHttp))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("API base URL is required"));
    }

    #[test]
    fn test_builder_rejects_unparseable_url() {
        let err = complete_builder()
            .api_base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builder_rejects_non_http_scheme() {
        let err = complete_builder()
            .api_base_url("ftp://files.example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_builder_requires_playback_adapter() {
        let err = CoreConfig::builder()
            .api_base_url("http://localhost:5000")
            .settings_store(Arc::new(NullSettings))
            .http_client(Arc::new(NullHttp))
            .build()
            .unwrap_err();

        match err {
            Error::CapabilityMissing { capability, .. } => assert_eq!(capability, "PlaybackAdapter"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builder_requires_settings_store() {
        let err = CoreConfig::builder()
            .api_base_url("http://localhost:5000")
            .playback_adapter(Arc::new(NullAdapter))
            .http_client(Arc::new(NullHttp))
            .build()
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("SettingsStore"));
        assert!(msg.contains("signed-in user"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client_without_shims() {
        let err = CoreConfig::builder()
            .api_base_url("http://localhost:5000")
            .playback_adapter(Arc::new(NullAdapter))
            .settings_store(Arc::new(NullSettings))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("HttpClient"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_shims_inject_http_client() {
        let config = CoreConfig::builder()
            .api_base_url("http://localhost:5000")
            .playback_adapter(Arc::new(NullAdapter))
            .settings_store(Arc::new(NullSettings))
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_load_timeout() {
        let err = complete_builder()
            .load_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Load timeout"));
    }

    #[test]
    fn test_validate_rejects_excessive_load_timeout() {
        let result = complete_builder()
            .load_timeout(Duration::from_secs(301))
            .build();
        assert!(result.is_err());

        let at_limit = complete_builder().load_timeout(MAX_LOAD_TIMEOUT).build();
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_validate_rejects_volume_out_of_range() {
        assert!(complete_builder().initial_volume(1.5).build().is_err());
        assert!(complete_builder().initial_volume(-0.1).build().is_err());
        assert!(complete_builder().initial_volume(0.0).build().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let err = complete_builder().event_buffer_size(0).build().unwrap_err();
        assert!(err.to_string().contains("Event buffer size"));
    }

    #[test]
    fn test_custom_playback_config() {
        let config = complete_builder()
            .load_timeout(Duration::from_secs(5))
            .progress_update_interval(Duration::from_millis(250))
            .initial_volume(0.5)
            .build()
            .unwrap();

        assert_eq!(config.playback.load_timeout, Duration::from_secs(5));
        assert_eq!(
            config.playback.progress_update_interval,
            Duration::from_millis(250)
        );
        assert_eq!(config.playback.initial_volume, 0.5);
    }

    #[test]
    fn test_config_is_cloneable_and_debug_hides_bridges() {
        let config = complete_builder().build().unwrap();
        let cloned = config.clone();
        assert_eq!(cloned.api_base_url, config.api_base_url);

        let debug = format!("{:?}", config);
        assert!(debug.contains("PlaybackAdapter { ... }"));
        assert!(debug.contains("10.0.2.2"));
    }
}
