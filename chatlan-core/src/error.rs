use thiserror::Error;

/// Why a scanned or pasted token could not be turned into a [`SignalEnvelope`].
///
/// [`SignalEnvelope`]: crate::model::SignalEnvelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown signal kind tag {0}")]
    UnknownKind(u8),
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("profile store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile store contents are malformed: {0}")]
    Json(#[from] serde_json::Error),
}
