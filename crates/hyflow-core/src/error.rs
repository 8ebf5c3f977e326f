use thiserror::Error;

/// Errors surfaced by the synchronization layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The API client reported a failure we could not absorb into a
    /// [`SyncState`](crate::SyncState) error string.
    #[error("API error: {0}")]
    Api(#[from] hyflow_api::Error),

    /// The telemetry stream could not be established.
    #[error("telemetry stream unavailable at {url}: {reason}")]
    StreamUnavailable { url: String, reason: String },

    /// Configuration was structurally invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}
