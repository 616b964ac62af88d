//! Time-related abstractions.
//!
//! Re-exports the executor's timer primitives together with the std clock
//! types so crates can bound slow operations (audio loads, HTTP calls)
//! without a direct Tokio dependency.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, timeout, Duration};
//!
//! async fn example() {
//!     let slow = sleep(Duration::from_secs(5));
//!     assert!(timeout(Duration::from_millis(10), slow).await.is_err());
//! }
//! ```

pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep, Timeout};

pub use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
