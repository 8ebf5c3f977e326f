// ── Normalized request outcome envelope ──
//
// Every network operation resolves to a RequestResult; nothing on the
// request path is raised past the executor boundary. Consumers branch
// on `success` instead of catching errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback message when a failure carries no usable detail.
pub(crate) const GENERIC_FAILURE: &str = "Request failed";

/// Normalized outcome of one network operation.
///
/// Invariants:
/// - `success == true` implies `message.is_empty()`
/// - `success == false` implies `data.is_none()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResult<T = Value> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> RequestResult<T> {
    /// A successful envelope wrapping `data`. The message is always empty.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: String::new(),
        }
    }

    /// A failed envelope. An empty message is replaced with the generic
    /// fallback so callers always have something to surface.
    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            message: if message.is_empty() {
                GENERIC_FAILURE.to_owned()
            } else {
                message
            },
        }
    }

    /// Map the payload type, preserving the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestResult<U> {
        RequestResult {
            success: self.success,
            data: self.data.map(f),
            message: self.message,
        }
    }
}

impl RequestResult<Value> {
    /// Decode the raw JSON payload into a typed envelope.
    ///
    /// A failed envelope passes through unchanged; a successful envelope
    /// whose body does not match `T` becomes a failure.
    pub fn decode<T: DeserializeOwned>(self) -> RequestResult<T> {
        match self.data {
            Some(value) if self.success => match serde_json::from_value(value) {
                Ok(data) => RequestResult::ok(data),
                Err(e) => RequestResult::fail(format!("Invalid response body: {e}")),
            },
            _ => RequestResult {
                success: self.success,
                data: None,
                message: self.message,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_has_empty_message() {
        let res = RequestResult::ok(json!({"a": 1}));
        assert!(res.success);
        assert!(res.message.is_empty());
        assert_eq!(res.data, Some(json!({"a": 1})));
    }

    #[test]
    fn fail_has_no_data() {
        let res: RequestResult = RequestResult::fail("boom");
        assert!(!res.success);
        assert!(res.data.is_none());
        assert_eq!(res.message, "boom");
    }

    #[test]
    fn fail_with_empty_message_uses_fallback() {
        let res: RequestResult = RequestResult::fail("");
        assert_eq!(res.message, GENERIC_FAILURE);
    }

    #[test]
    fn decode_success() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Body {
            a: i32,
        }

        let res = RequestResult::ok(json!({"a": 7})).decode::<Body>();
        assert!(res.success);
        assert_eq!(res.data.unwrap(), Body { a: 7 });
    }

    #[test]
    fn decode_failure_passes_through() {
        let res = RequestResult::fail("down").decode::<Vec<i32>>();
        assert!(!res.success);
        assert_eq!(res.message, "down");
    }

    #[test]
    fn decode_mismatch_becomes_failure() {
        let res = RequestResult::ok(json!("not a list")).decode::<Vec<i32>>();
        assert!(!res.success);
        assert!(res.data.is_none());
        assert!(res.message.starts_with("Invalid response body"));
    }
}
