// Hand-crafted async HTTP client for the hyflow backend REST surface.
//
// Every call goes through `execute`, which performs bounded retry with
// backoff and normalizes all outcomes — transport failures, 4xx, 5xx,
// decode problems — into a `RequestResult` envelope. Nothing on this
// path is raised past the executor boundary.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::Error;
use crate::result::{GENERIC_FAILURE, RequestResult};

pub use reqwest::Method;

/// Per-attempt timeout. A timed-out attempt counts as a transport
/// failure for retry purposes.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

// ── Error response shape from the backend ────────────────────────────

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
}

// ── DecisionMode ─────────────────────────────────────────────────────

/// Which decision engine enriches the fleet listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionMode {
    /// ML efficiency model (default).
    #[default]
    Ml,
    /// Static rule engine.
    Rule,
}

impl DecisionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ml => "ml",
            Self::Rule => "rule",
        }
    }
}

// ── RetryPolicy ──────────────────────────────────────────────────────

/// Bounded retry schedule for the request executor.
///
/// Defaults to 3 total attempts with 250 ms then 500 ms pauses before
/// attempts 2 and 3. Retries apply only when no status was received
/// (transport/timeout) or the status is >= 500; 4xx responses surface
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Minimum 1.
    pub max_attempts: u32,
    /// Pause before retry N is `backoff[N-1]`; the last entry repeats
    /// if the schedule is shorter than the attempt budget.
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: vec![Duration::from_millis(250), Duration::from_millis(500)],
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (0-based).
    fn delay_after(&self, attempt: u32) -> Duration {
        let idx = attempt as usize;
        self.backoff
            .get(idx)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the hyflow backend REST surface.
///
/// The base URL is injected once at construction (see `hyflow-config`
/// for resolution); call sites never consult the ambient environment.
#[derive(Debug, Clone)]
pub struct HyflowClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryPolicy,
}

impl HyflowClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client against `base` with the default retry policy.
    pub fn new(base: Url) -> Result<Self, Error> {
        Self::with_retry(base, RetryPolicy::default())
    }

    /// Build a client with an explicit retry policy (used by tests to
    /// shrink the backoff schedule).
    pub fn with_retry(base: Url, retry: RetryPolicy) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .user_agent(concat!("hyflow/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::from_reqwest(base, http, retry))
    }

    /// Wrap an existing `reqwest::Client` (caller manages timeouts).
    pub fn from_reqwest(base: Url, http: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { http, base, retry }
    }

    /// The injected base URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an absolute backend path (e.g. `"/transport/fleet"`) onto
    /// the base URL, preserving any base path prefix such as `/api`.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    fn endpoint_with_params(&self, path: &str, params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    // ── Request executor ─────────────────────────────────────────────

    /// Issue one logical request with bounded retry and backoff.
    ///
    /// Always resolves to an envelope; no error crosses this boundary.
    /// Failure message precedence: server `detail` field, then transport
    /// error text, then a generic fallback.
    pub async fn execute(&self, method: Method, path: &str, body: Option<&Value>) -> RequestResult {
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(e) => return RequestResult::fail(e.to_string()),
        };
        self.execute_url(method, url, body).await
    }

    async fn execute_url(&self, method: Method, url: Url, body: Option<&Value>) -> RequestResult {
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 0..attempts {
            debug!(%method, %url, attempt, "request");

            match self.attempt(method.clone(), url.clone(), body).await {
                Ok(data) => return RequestResult::ok(data),
                Err(error) => {
                    if !error.is_retryable() || attempt + 1 == attempts {
                        return RequestResult::fail(envelope_message(&error));
                    }

                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        %url,
                        attempt,
                        status = ?error.status(),
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        // Unreachable with max_attempts >= 1; kept for totality.
        RequestResult::fail(GENERIC_FAILURE)
    }

    /// One attempt, classified into the [`Error`] taxonomy: transport
    /// failures stay [`Error::Transport`], non-success statuses become
    /// [`Error::Server`] (5xx) or [`Error::Client`] (everything else).
    async fn attempt(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value, Error> {
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let text = response.text().await?;

        if !status.is_success() {
            let status = status.as_u16();
            let message = failure_message(&text, status);
            return Err(if status >= 500 {
                Error::Server { status, message }
            } else {
                Error::Client { status, message }
            });
        }

        if content_type.contains("application/json") {
            serde_json::from_str(&text).map_err(|e| Error::Client {
                status: status.as_u16(),
                message: format!("Invalid JSON body: {e}"),
            })
        } else {
            Ok(Value::String(text))
        }
    }

    // ━━ Endpoint surface ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //
    // All bodies are pass-through JSON: forms own validation, the
    // backend owns interpretation.

    // ── Production ───────────────────────────────────────────────────

    pub async fn production_all(&self) -> RequestResult {
        self.execute(Method::GET, "/production/all", None).await
    }

    pub async fn production_add(&self, body: &Value) -> RequestResult {
        self.execute(Method::POST, "/production/add", Some(body))
            .await
    }

    pub async fn production_update_output(&self, id: &str, body: &Value) -> RequestResult {
        self.execute(
            Method::PUT,
            &format!("/production/update-output/{id}"),
            Some(body),
        )
        .await
    }

    // ── Storage ──────────────────────────────────────────────────────

    pub async fn storage_all(&self) -> RequestResult {
        self.execute(Method::GET, "/storage/all", None).await
    }

    pub async fn storage_add(&self, body: &Value) -> RequestResult {
        self.execute(Method::POST, "/storage/add", Some(body)).await
    }

    pub async fn storage_update(&self, id: &str, body: &Value) -> RequestResult {
        self.execute(Method::PUT, &format!("/storage/update/{id}"), Some(body))
            .await
    }

    // ── Transport ────────────────────────────────────────────────────

    pub async fn transport_fleet(&self, mode: DecisionMode) -> RequestResult {
        let url = match self.endpoint_with_params(
            "/transport/fleet",
            &[("decision_mode", mode.as_str().to_owned())],
        ) {
            Ok(url) => url,
            Err(e) => return RequestResult::fail(e.to_string()),
        };
        self.execute_url(Method::GET, url, None).await
    }

    pub async fn transport_add_vehicle(&self, body: &Value) -> RequestResult {
        self.execute(Method::POST, "/transport/add-vehicle", Some(body))
            .await
    }

    pub async fn transport_optimal_route(&self, body: &Value) -> RequestResult {
        self.execute(Method::POST, "/transport/optimal-route", Some(body))
            .await
    }

    /// Point-to-point route lookup; coordinates travel as `lat,lon` pairs.
    pub async fn transport_route(
        &self,
        source: [f64; 2],
        destination: [f64; 2],
    ) -> RequestResult {
        let url = match self.endpoint_with_params(
            "/route",
            &[
                ("source", format!("{},{}", source[0], source[1])),
                ("destination", format!("{},{}", destination[0], destination[1])),
            ],
        ) {
            Ok(url) => url,
            Err(e) => return RequestResult::fail(e.to_string()),
        };
        self.execute_url(Method::GET, url, None).await
    }

    /// Best-vehicle selection for a delivery.
    pub async fn fleet_optimize(&self, destination: [f64; 2], hydrogen_load: f64) -> RequestResult {
        let body = serde_json::json!({
            "destination": destination,
            "hydrogen_load": hydrogen_load,
        });
        self.execute(Method::POST, "/fleet/optimize", Some(&body))
            .await
    }

    pub async fn fleet_assign(&self, body: &Value) -> RequestResult {
        self.execute(Method::POST, "/fleet/assign", Some(body))
            .await
    }

    /// Retrain the fleet efficiency model.
    pub async fn train(&self) -> RequestResult {
        self.execute(
            Method::POST,
            "/train",
            Some(&Value::Object(Default::default())),
        )
        .await
    }

    // ── Predictions ──────────────────────────────────────────────────

    pub async fn prediction_demand(&self) -> RequestResult {
        self.execute(Method::GET, "/prediction/demand", None).await
    }

    pub async fn prediction_renewable(&self) -> RequestResult {
        self.execute(Method::GET, "/prediction/renewable", None)
            .await
    }

    pub async fn prediction_storage_alerts(&self) -> RequestResult {
        self.execute(Method::GET, "/prediction/storage-alerts", None)
            .await
    }

    pub async fn dashboard_summary(&self) -> RequestResult {
        self.execute(Method::GET, "/dashboard/summary", None).await
    }

    /// On-demand regional demand estimate.
    pub async fn demand_predict(
        &self,
        region: &str,
        weather_risk: f64,
        traffic_score: f64,
    ) -> RequestResult {
        let body = serde_json::json!({
            "region": region,
            "weather_risk": weather_risk,
            "traffic_score": traffic_score,
        });
        self.execute(Method::POST, "/demand/predict", Some(&body))
            .await
    }
}

/// The text that lands in the envelope's `message` field: backend
/// errors already carry the extracted detail, transport errors keep
/// reqwest's own wording.
fn envelope_message(error: &Error) -> String {
    match error {
        Error::Server { message, .. } | Error::Client { message, .. } => message.clone(),
        Error::Transport(e) => e.to_string(),
        other => other.to_string(),
    }
}

/// Extract the most useful failure message from an error body:
/// the JSON `detail` field if present, the raw body if non-empty,
/// else a status line.
fn failure_message(body: &str, status: u16) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(detail) = err.detail {
            return detail;
        }
    }
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> HyflowClient {
        HyflowClient::new("http://localhost:8000/api".parse().unwrap()).unwrap()
    }

    #[test]
    fn endpoint_preserves_base_path_prefix() {
        let url = client().endpoint("/transport/fleet").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/transport/fleet");
    }

    #[test]
    fn endpoint_with_params_appends_query() {
        let url = client()
            .endpoint_with_params("/transport/fleet", &[("decision_mode", "rule".into())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/transport/fleet?decision_mode=rule"
        );
    }

    #[test]
    fn retry_schedule_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_after(0), Duration::from_millis(250));
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        // Past the schedule the last entry repeats.
        assert_eq!(policy.delay_after(5), Duration::from_millis(500));
    }

    #[test]
    fn failure_message_prefers_detail_field() {
        let body = r#"{"detail": "tank not found"}"#;
        assert_eq!(failure_message(body, 404), "tank not found");
    }

    #[test]
    fn failure_message_falls_back_to_body_then_status() {
        assert_eq!(failure_message("upstream exploded", 502), "upstream exploded");
        assert_eq!(failure_message("", 502), "HTTP 502");
    }
}
