//! Command handlers, one module per top-level command.

pub mod config_cmd;
pub mod prediction;
pub mod production;
pub mod storage;
pub mod transport;
pub mod util;
pub mod watch;

use crate::cli::Command;
use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_output, render_single};

/// Route a parsed command to its handler.
pub async fn dispatch(command: Command, ctx: &Context) -> Result<(), CliError> {
    match command {
        Command::Production(args) => production::handle(args, ctx).await,
        Command::Storage(args) => storage::handle(args, ctx).await,
        Command::Transport(args) => transport::handle(args, ctx).await,
        Command::Prediction(args) => prediction::handle(args, ctx).await,
        Command::Dashboard => dashboard_summary(ctx).await,
        Command::Watch(args) => watch::handle(args, ctx).await,
        // handled in main before a context exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

async fn dashboard_summary(ctx: &Context) -> Result<(), CliError> {
    let summary = util::into_data(ctx.client.dashboard_summary().await)?;
    let rendered = render_single(
        ctx.format,
        &summary,
        crate::output::render_json_pretty,
        ToString::to_string,
    );
    print_output(&rendered, ctx.quiet);
    Ok(())
}
