//! Helpers shared across command handlers.

use hyflow_api::RequestResult;
use serde_json::Value;

use crate::error::CliError;

/// Unwrap a request envelope into its payload, or surface its message.
pub fn into_data<T>(result: RequestResult<T>) -> Result<T, CliError> {
    if result.success {
        result.data.ok_or_else(|| CliError::ApiError {
            message: "empty response".into(),
        })
    } else {
        Err(CliError::ApiError {
            message: result.message,
        })
    }
}

/// Parse a JSON body argument: inline JSON, or `@path` to read a file.
pub fn parse_body(raw: &str) -> Result<Value, CliError> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_owned(),
    };
    Ok(serde_json::from_str(&text)?)
}

/// Format an optional score for table cells.
pub fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".into(), |s| format!("{s:.1}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn into_data_surfaces_the_failure_message() {
        let err = into_data(RequestResult::<Value>::fail("backend down")).unwrap_err();
        assert!(matches!(err, CliError::ApiError { message } if message == "backend down"));
    }

    #[test]
    fn parse_body_accepts_inline_json() {
        assert_eq!(parse_body("{\"a\":1}").unwrap(), json!({"a":1}));
        assert!(parse_body("not json").is_err());
    }
}
