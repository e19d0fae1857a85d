use thiserror::Error;

#[derive(Debug, Error)]
pub enum KioskError {
    #[error("backend not reachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("backend returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("speech recognition is not supported on this platform")]
    RecognitionUnsupported,

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("there is nothing in the cart to order")]
    EmptyCart,

    #[error("order was not confirmed")]
    Declined,
}

impl KioskError {
    /// True for failures that came from talking to the backend.
    pub fn is_network(&self) -> bool {
        matches!(self, KioskError::Network(_) | KioskError::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
