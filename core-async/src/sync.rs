//! Synchronization primitives.
//!
//! All primitives are async-aware: awaiting a lock or a channel never blocks
//! the executor thread. `Mutex` acquisition is FIFO, which the playback
//! session relies on to serialize overlapping requests in arrival order.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, Mutex};
//!
//! async fn example() {
//!     let slot = Mutex::new(None::<String>);
//!     *slot.lock().await = Some("a.mp3".to_string());
//!
//!     let (tx, rx) = watch::channel(0u64);
//!     tx.send_replace(5);
//!     assert_eq!(*rx.borrow(), 5);
//! }
//! ```

pub use tokio::sync::{broadcast, mpsc, watch, Mutex};
