//! Runtime abstraction layer for the Aatmabeat core.
//!
//! Every core crate goes through this crate instead of naming Tokio directly,
//! so the executor can be swapped for a host-provided one without touching
//! the playback or service code.
//!
//! # Modules
//!
//! - `task`: Task spawning and join handles
//! - `time`: Sleep, timeouts and instants
//! - `sync`: Async-aware locks and channels (mutex, watch, broadcast, mpsc)
//! - `runtime`: `block_on` for synchronous entry points and tests
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{timeout, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     let value = timeout(Duration::from_secs(1), handle).await;
//!     assert!(value.is_ok());
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
