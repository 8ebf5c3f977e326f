//! Shared configuration for the hyflow CLI.
//!
//! TOML config file, environment overrides, base-URL resolution, and
//! translation to `hyflow_core::DashboardConfig`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use hyflow_api::DecisionMode;
use hyflow_core::DashboardConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Environment variable that overrides the API base URL outright.
pub const API_BASE_ENV: &str = "HYFLOW_API_BASE";

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// API base URL including the `/api` prefix. When unset, resolution
    /// falls back to [`DEFAULT_API_BASE`].
    pub api_base: Option<String>,

    /// Polling cadence in seconds; `0` disables periodic refresh.
    #[serde(default = "default_refresh")]
    pub refresh_interval_secs: u64,

    /// Fleet decision engine: "ml" or "rule".
    #[serde(default)]
    pub decision_mode: DecisionMode,

    /// Output format for the CLI: "table" or "json".
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            refresh_interval_secs: default_refresh(),
            decision_mode: DecisionMode::default(),
            output: default_output(),
        }
    }
}

fn default_refresh() -> u64 {
    10
}
fn default_output() -> String {
    "table".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "hyflow", "hyflow").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hyflow");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from defaults + file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Same as [`load_config`] but against an explicit file path.
pub fn load_config_from(path: &std::path::Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HYFLOW_").ignore(&["API_BASE"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is bad.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Base URL resolution ─────────────────────────────────────────────

/// Resolves the API base URL from, in order: an explicit override
/// (CLI flag or [`API_BASE_ENV`]), a deployment origin, and the local
/// default.
///
/// A localhost origin still resolves to [`DEFAULT_API_BASE`] because the
/// backend listens on its own port during local development; any other
/// origin serves the API under its own `/api` path.
pub fn resolve_api_base(
    override_base: Option<&str>,
    origin: Option<&Url>,
) -> Result<Url, ConfigError> {
    if let Some(base) = override_base.filter(|s| !s.trim().is_empty()) {
        return parse_base(base);
    }
    match origin {
        Some(origin) if !is_localhost(origin) => {
            let joined = format!("{}/api", origin.as_str().trim_end_matches('/'));
            parse_base(&joined)
        }
        _ => parse_base(DEFAULT_API_BASE),
    }
}

fn is_localhost(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

fn parse_base(s: &str) -> Result<Url, ConfigError> {
    s.parse().map_err(|_| ConfigError::Validation {
        field: "api_base".into(),
        reason: format!("invalid URL: {s}"),
    })
}

// ── Translation to core ─────────────────────────────────────────────

impl Config {
    /// Builds the resolved runtime config, honoring [`API_BASE_ENV`] over
    /// the file's `api_base`.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let env_base = std::env::var(API_BASE_ENV).ok();
        let override_base = env_base.as_deref().or(self.api_base.as_deref());
        let base = resolve_api_base(override_base, None)?;
        let mut cfg = DashboardConfig::new(base);
        cfg.decision_mode = self.decision_mode;
        cfg.refresh_interval = match self.refresh_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(cfg)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn override_wins_over_everything() {
        let origin: Url = "https://dash.example.com".parse().unwrap();
        let base = resolve_api_base(Some("https://api.example.com/v2"), Some(&origin)).unwrap();
        assert_eq!(base.as_str(), "https://api.example.com/v2");
    }

    #[test]
    fn blank_override_is_ignored() {
        let base = resolve_api_base(Some("   "), None).unwrap();
        assert_eq!(base.as_str(), DEFAULT_API_BASE);
    }

    #[test]
    fn localhost_origin_resolves_to_local_backend() {
        let origin: Url = "http://localhost:3000".parse().unwrap();
        let base = resolve_api_base(None, Some(&origin)).unwrap();
        assert_eq!(base.as_str(), DEFAULT_API_BASE);
    }

    #[test]
    fn remote_origin_gets_api_suffix() {
        let origin: Url = "https://dash.example.com".parse().unwrap();
        let base = resolve_api_base(None, Some(&origin)).unwrap();
        assert_eq!(base.as_str(), "https://dash.example.com/api");
    }

    #[test]
    fn no_inputs_yield_the_default() {
        let base = resolve_api_base(None, None).unwrap();
        assert_eq!(base.as_str(), DEFAULT_API_BASE);
    }

    #[test]
    fn invalid_override_is_a_validation_error() {
        let err = resolve_api_base(Some("not a url"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn config_file_round_trips_through_figment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_base = \"http://10.0.0.5:8000/api\"\nrefresh_interval_secs = 30\ndecision_mode = \"rule\"\n",
        )
        .unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.api_base.as_deref(), Some("http://10.0.0.5:8000/api"));
        assert_eq!(cfg.refresh_interval_secs, 30);
        assert_eq!(cfg.decision_mode, DecisionMode::Rule);
        assert_eq!(cfg.output, "table");
    }

    #[test]
    fn zero_refresh_disables_polling() {
        let cfg = Config {
            refresh_interval_secs: 0,
            ..Config::default()
        };
        let dashboard = cfg.to_dashboard_config().unwrap();
        assert_eq!(dashboard.refresh_interval, None);
    }
}
