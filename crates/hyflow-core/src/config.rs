use std::time::Duration;

use hyflow_api::{DecisionMode, HyflowClient, RetryPolicy};
use url::Url;

use crate::error::CoreError;

/// Runtime settings for one dashboard session.
///
/// This is the resolved form; loading from files and the environment
/// lives in `hyflow-config`.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the backend API, including the `/api` prefix.
    pub base: Url,
    /// How the fleet endpoints pick recommendations.
    pub decision_mode: DecisionMode,
    /// Polling cadence for synchronized resources; `None` polls only on
    /// demand.
    pub refresh_interval: Option<Duration>,
    pub retry: RetryPolicy,
}

impl DashboardConfig {
    pub const DEFAULT_BASE: &'static str = "http://localhost:8000/api";
    pub const DEFAULT_REFRESH: Duration = Duration::from_secs(10);

    /// Builds a config for `base`, with the standard cadence and retry
    /// schedule.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            decision_mode: DecisionMode::default(),
            refresh_interval: Some(Self::DEFAULT_REFRESH),
            retry: RetryPolicy::default(),
        }
    }

    /// Constructs the API client this config describes.
    pub fn client(&self) -> Result<HyflowClient, CoreError> {
        HyflowClient::with_retry(self.base.clone(), self.retry.clone()).map_err(CoreError::Api)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let base = Self::DEFAULT_BASE
            .parse()
            .unwrap_or_else(|_| unreachable!("default base URL is valid"));
        Self::new(base)
    }
}
