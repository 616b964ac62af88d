//! Errors raised while assembling the runtime (configuration, logging).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A value was missing or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host did not provide a bridge the core cannot run without.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Name of the missing bridge, for hosts that want to branch on it.
    pub fn missing_capability(&self) -> Option<&str> {
        match self {
            Error::CapabilityMissing { capability, .. } => Some(capability),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
