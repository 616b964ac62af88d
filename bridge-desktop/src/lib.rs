//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for desktop builds and
//! integration tests:
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a SQLite key-value table (`sqlx`)
//!
//! There is no desktop `PlaybackAdapter`; the host injects its audio engine.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http = ReqwestHttpClient::new()?;
//!     let settings = SqliteSettingsStore::new("aatmabeat/settings.db".into()).await?;
//!     Ok(())
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
