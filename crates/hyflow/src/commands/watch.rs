//! Live telemetry stream handler.

use chrono::Local;
use hyflow_core::TelemetryFeed;
use owo_colors::OwoColorize;

use crate::cli::WatchArgs;
use crate::context::Context;
use crate::error::CliError;

/// Follows the backend telemetry stream, printing one line per snapshot
/// until interrupted, the server closes the stream, or `--count` is hit.
pub async fn handle(args: WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let feed = TelemetryFeed::connect(&ctx.config.base).await?;
    let mut snapshots = feed.snapshots();
    let mut seen: u64 = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // ingest ended: the server closed the stream
                    if !ctx.quiet {
                        eprintln!("telemetry stream closed by server");
                    }
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(ctx, &snapshot, &feed);
                seen += 1;
                if args.count.is_some_and(|n| seen >= n) {
                    break;
                }
            }
        }
    }

    feed.close();
    Ok(())
}

fn print_snapshot(
    ctx: &Context,
    snapshot: &hyflow_api::TelemetrySnapshot,
    feed: &TelemetryFeed,
) {
    if ctx.quiet {
        return;
    }
    let stamp = feed
        .last_event()
        .map_or_else(String::new, |t| {
            t.with_timezone(&Local).format("%H:%M:%S").to_string()
        });
    let (lat, lon) = *feed.map_center().borrow();
    let line = format!(
        "{stamp}  vehicles={:<3} traffic={:.2} weather={:.2} center=({lat:.4}, {lon:.4})",
        snapshot.vehicles.len(),
        snapshot.traffic,
        snapshot.weather,
    );
    if ctx.color {
        println!("{}", line.green());
    } else {
        println!("{line}");
    }
}
