//! # Host Bridge Traits
//!
//! Capabilities the Aatmabeat core needs from its host but cannot provide
//! itself.
//!
//! ## Traits
//!
//! ### Audio
//! - [`PlaybackAdapter`](playback::PlaybackAdapter) - Creates and drives decoded-audio resources
//! - [`PlaybackStatusListener`](playback::PlaybackStatusListener) - Receives status pushes from a live resource
//!
//! ### Networking & Storage
//! - [`HttpClient`](http::HttpClient) - Async HTTP with retry
//! - [`SettingsStore`](storage::SettingsStore) - Opaque key-value storage (the persisted user lives here)
//!
//! ### Logging
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to the host logger
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Provides |
//! |----------|---------------------|----------|
//! | Desktop  | `bridge-desktop`    | `HttpClient`, `SettingsStore` |
//! | Mobile   | host app            | everything, including `PlaybackAdapter` |
//!
//! There is no desktop `PlaybackAdapter`; the host always injects the audio
//! engine.
//!
//! ## Fail-Fast Strategy
//!
//! The core refuses to start when a required capability is missing:
//!
//! ```ignore
//! let adapter = self.playback_adapter
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "PlaybackAdapter".to_string(),
//!         message: "Inject the host audio engine.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! Every trait returns [`BridgeError`](error::BridgeError). Implementations
//! convert their native errors and keep messages actionable. Connectivity
//! failures should use [`BridgeError::Network`] so callers can tell them apart.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`; the core shares them across tasks behind
//! `Arc`.

pub mod error;
pub mod http;
pub mod logging;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use logging::{LogEntry, LogLevel, LoggerSink};
pub use playback::{
    AudioSource, HandleId, PlaybackAdapter, PlaybackMetadata, PlaybackOptions, PlaybackRequest,
    PlaybackStatus, PlaybackStatusListener,
};
pub use storage::SettingsStore;
