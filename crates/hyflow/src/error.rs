//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use hyflow_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(hyflow::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Override with --api-base or HYFLOW_API_BASE."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("API request failed: {message}")]
    #[diagnostic(code(hyflow::api_error))]
    ApiError { message: String },

    #[error("vehicle '{vehicle_id}' not found in the fleet")]
    #[diagnostic(
        code(hyflow::vehicle_not_found),
        help("Run: hyflow transport fleet to see known vehicles")
    )]
    VehicleNotFound { vehicle_id: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hyflow::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(hyflow::config))]
    Config(#[from] hyflow_config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(hyflow::json), help("Check the JSON body and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::VehicleNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StreamUnavailable { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Config(message) => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Api(err) => CliError::ApiError {
                message: err.to_string(),
            },
        }
    }
}
