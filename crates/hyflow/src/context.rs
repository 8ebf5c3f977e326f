//! Resolved runtime context shared by command handlers.

use hyflow_api::HyflowClient;
use hyflow_config::resolve_api_base;
use hyflow_core::DashboardConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::should_color;

pub struct Context {
    pub config: DashboardConfig,
    pub client: HyflowClient,
    pub format: OutputFormat,
    pub quiet: bool,
    pub color: bool,
}

impl Context {
    /// Resolves config file + environment + CLI flags into a ready
    /// context. Flags win over the environment, which wins over the file.
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let file_cfg = hyflow_config::load_config_or_default();
        let mut config = file_cfg.to_dashboard_config()?;

        // clap already folded HYFLOW_API_BASE into the flag
        if let Some(base) = global.api_base.as_deref() {
            config.base = resolve_api_base(Some(base), None)?;
        }

        let client = config.client()?;
        let format = global
            .output
            .unwrap_or_else(|| parse_output(&file_cfg.output));

        Ok(Self {
            config,
            client,
            format,
            quiet: global.quiet,
            color: should_color(global.color),
        })
    }
}

fn parse_output(name: &str) -> OutputFormat {
    match name {
        "json" => OutputFormat::Json,
        "json-compact" => OutputFormat::JsonCompact,
        "plain" => OutputFormat::Plain,
        _ => OutputFormat::Table,
    }
}
