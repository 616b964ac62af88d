use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    /// The backend answered with a non-success status or an error body.
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No user is signed in")]
    NotSignedIn,

    /// Persisted data could not be read back.
    #[error("Stored data is unreadable: {0}")]
    Storage(String),
}

impl CoreError {
    /// Returns `true` when the request never reached the backend.
    pub fn is_network_error(&self) -> bool {
        match self {
            CoreError::Bridge(err) => err.is_network(),
            CoreError::Playback(err) => err.is_network_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
