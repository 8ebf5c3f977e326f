use thiserror::Error;

/// Top-level error type for the `hyflow-api` crate.
///
/// The request path folds every failure into a [`crate::RequestResult`]
/// envelope at the executor boundary, so `Error` only escapes from
/// client construction, URL handling, and telemetry stream setup.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Backend ─────────────────────────────────────────────────────
    /// Server-side failure (status >= 500). Retryable.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Client-side failure (status 4xx). Not retryable.
    #[error("Client error (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    // ── Telemetry stream ────────────────────────────────────────────
    /// The SSE connection could not be established.
    #[error("Telemetry stream connection failed: {0}")]
    StreamConnect(String),
}

impl Error {
    /// Returns `true` if a fresh attempt might succeed: transport
    /// failures (no status received) and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.status().is_none_or(|s| s.is_server_error()),
            Self::Server { .. } => true,
            Self::Client { .. } | Self::InvalidUrl(_) | Self::StreamConnect(_) => false,
        }
    }

    /// The HTTP status carried by this error, if any was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            Self::InvalidUrl(_) | Self::StreamConnect(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Error;

    #[test]
    fn server_errors_are_retryable_and_carry_their_status() {
        let err = Error::Server {
            status: 503,
            message: "overloaded".into(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn client_errors_are_terminal() {
        let err = Error::Client {
            status: 404,
            message: "no such tank".into(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn stream_connect_failures_are_terminal_and_statusless() {
        let err = Error::StreamConnect("connection refused".into());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
    }
}
