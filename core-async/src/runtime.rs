//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates use [`block_on`] for synchronous entry points (the
//! `#[core_async::test]` and `#[core_async::main]` macros expand to it) and
//! [`Handle`] to detect whether they are already running inside a runtime.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Spawned tasks make progress only while the outer future is suspended,
/// which keeps test schedules deterministic.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Returns `true` when called from inside a running executor.
pub fn in_runtime() -> bool {
    Handle::try_current().is_ok()
}
