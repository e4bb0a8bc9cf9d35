//! Recorder errors

/// Delivery failure reported by a [`Sink`](crate::Sink)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    #[error("Payload rejected: {0}")]
    Rejected(String),

    #[error("Sink closed")]
    Closed,

    #[error("Sink panicked during delivery")]
    Panicked,
}

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Upload failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Invalid configuration: {0}")]
    Config(serde_json::Error),
}

pub type RecorderResult<T> = Result<T, RecorderError>;
