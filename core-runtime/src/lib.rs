//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the playback and service crates:
//! - Logging and tracing setup
//! - Configuration ([`config::CoreConfig`])
//! - Event bus ([`events::EventBus`])
//!
//! Nothing here knows about tracks or sessions; it only establishes the
//! conventions the other crates follow.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
