//! Transport fleet command handlers.

use std::time::Duration;

use hyflow_api::DecisionMode;
use hyflow_core::{
    FleetSummary, Producer, RouteSelection, SyncUnit, Vehicle, capacity_for, efficiency_histogram,
    fleet::HISTOGRAM_BUCKETS, summarize,
};
use owo_colors::OwoColorize;
use tabled::Tabled;

use crate::cli::{TransportArgs, TransportCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_output, render_list, render_single};

use super::util;

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "VEHICLE")]
    id: String,
    #[tabled(rename = "MODE")]
    mode: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LOAD KG")]
    load: String,
    #[tabled(rename = "CAP KG")]
    capacity: String,
    #[tabled(rename = "EFF")]
    efficiency: String,
    #[tabled(rename = "ACTION")]
    action: String,
}

fn to_row(vehicle: &Vehicle) -> VehicleRow {
    VehicleRow {
        id: vehicle.vehicle_id.clone(),
        mode: vehicle.mode.to_string(),
        status: vehicle.status.clone(),
        load: format!("{:.0}", vehicle.load_kg),
        capacity: format!("{:.0}", capacity_for(vehicle.mode)),
        efficiency: util::fmt_score(vehicle.efficiency_score),
        action: vehicle.recommended_action.clone().unwrap_or_else(|| "-".into()),
    }
}

pub async fn handle(args: TransportArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        TransportCommand::Fleet {
            mode,
            follow,
            interval,
        } => {
            let mode = mode.map_or(ctx.config.decision_mode, Into::into);
            if follow {
                follow_fleet(ctx, mode, Duration::from_secs(interval.max(1))).await
            } else {
                let fleet = fetch_fleet(ctx, mode).await?;
                let rendered = render_list(ctx.format, &fleet, to_row, |v| v.vehicle_id.clone());
                print_output(&rendered, ctx.quiet);
                Ok(())
            }
        }

        TransportCommand::Summary { mode } => {
            let mode = mode.map_or(ctx.config.decision_mode, Into::into);
            let summary = summarize(&fetch_fleet(ctx, mode).await?);
            let rendered = render_single(ctx.format, &summary, summary_detail, |s| {
                format!("{} {} {}", s.high_efficiency, s.overloaded, s.maintenance)
            });
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        TransportCommand::Histogram { mode } => {
            let mode = mode.map_or(ctx.config.decision_mode, Into::into);
            let buckets = efficiency_histogram(&fetch_fleet(ctx, mode).await?);
            let rendered = match ctx.format {
                crate::cli::OutputFormat::Json => crate::output::render_json_pretty(&buckets),
                crate::cli::OutputFormat::JsonCompact => {
                    crate::output::render_json_compact(&buckets)
                }
                _ => render_histogram(buckets, ctx),
            };
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        TransportCommand::Route { vehicle_id, mode } => {
            let mode = mode.map_or(ctx.config.decision_mode, Into::into);
            let fleet = fetch_fleet(ctx, mode).await?;
            let vehicle = fleet
                .iter()
                .find(|v| v.vehicle_id == vehicle_id)
                .ok_or(CliError::VehicleNotFound { vehicle_id })?;
            let route = RouteSelection::for_vehicle(vehicle);
            let rendered = render_single(ctx.format, &route, route_detail, |r| {
                r.distance_km.map_or_else(|| "-".into(), |d| format!("{d:.1}"))
            });
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        TransportCommand::AddVehicle { body } => {
            let body = util::parse_body(&body)?;
            let created = util::into_data(ctx.client.transport_add_vehicle(&body).await)?;
            print_value(ctx, &created);
            Ok(())
        }

        TransportCommand::Optimize { lat, lon, load } => {
            let picked = util::into_data(ctx.client.fleet_optimize([lat, lon], load).await)?;
            print_value(ctx, &picked);
            Ok(())
        }

        TransportCommand::Assign { body } => {
            let body = util::parse_body(&body)?;
            let assigned = util::into_data(ctx.client.fleet_assign(&body).await)?;
            print_value(ctx, &assigned);
            Ok(())
        }

        TransportCommand::Train => {
            let outcome = util::into_data(ctx.client.train().await)?;
            print_value(ctx, &outcome);
            Ok(())
        }
    }
}

async fn fetch_fleet(ctx: &Context, mode: DecisionMode) -> Result<Vec<Vehicle>, CliError> {
    util::into_data(ctx.client.transport_fleet(mode).await.decode())
}

/// Keep the fleet listing synchronized, re-rendering after each refresh
/// until interrupted. Failed refreshes keep the previous listing on
/// screen and note the error on stderr.
async fn follow_fleet(ctx: &Context, mode: DecisionMode, every: Duration) -> Result<(), CliError> {
    let client = ctx.client.clone();
    let producer = Producer::new(move || {
        let client = client.clone();
        async move { client.transport_fleet(mode).await.decode::<Vec<Vehicle>>() }
    });
    let unit = SyncUnit::spawn(producer, Some(every));
    let mut rx = unit.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.loading {
                    continue;
                }
                if let Some(err) = &state.error {
                    eprintln!("refresh failed: {err} (showing last known fleet)");
                }
                if let Some(fleet) = &state.data {
                    let rendered = render_list(ctx.format, fleet, to_row, |v| v.vehicle_id.clone());
                    print_output(&rendered, ctx.quiet);
                }
            }
        }
    }
    unit.shutdown();
    Ok(())
}

fn print_value(ctx: &Context, value: &serde_json::Value) {
    let rendered = render_single(
        ctx.format,
        value,
        crate::output::render_json_pretty,
        ToString::to_string,
    );
    print_output(&rendered, ctx.quiet);
}

fn summary_detail(summary: &FleetSummary) -> String {
    format!(
        "high efficiency: {}\noverloaded:      {}\nmaintenance:     {}",
        summary.high_efficiency, summary.overloaded, summary.maintenance
    )
}

fn route_detail(route: &RouteSelection) -> String {
    let fmt_point = |p: Option<[f64; 2]>| {
        p.map_or_else(|| "-".into(), |[lat, lon]| format!("{lat:.4}, {lon:.4}"))
    };
    let mut out = format!(
        "source:      {}\ndestination: {}",
        fmt_point(route.source),
        fmt_point(route.destination)
    );
    if let Some(d) = route.distance_km {
        out.push_str(&format!("\ndistance:    {d:.1} km"));
    }
    if let Some(d) = route.duration_min {
        out.push_str(&format!("\nduration:    {d:.0} min"));
    }
    if let Some(geometry) = &route.geometry {
        out.push_str(&format!("\nwaypoints:   {}", geometry.len()));
    }
    out
}

fn render_histogram(buckets: [usize; HISTOGRAM_BUCKETS], ctx: &Context) -> String {
    let mut lines = Vec::with_capacity(HISTOGRAM_BUCKETS);
    for (i, count) in buckets.iter().enumerate() {
        let lo = i * 20;
        let label = if i == HISTOGRAM_BUCKETS - 1 {
            format!("{lo:>3}+   ")
        } else {
            format!("{lo:>3}-{:<3}", lo + 20)
        };
        let bar = "█".repeat(*count);
        let bar = if ctx.color {
            bar.cyan().to_string()
        } else {
            bar
        };
        lines.push(format!("{label} {bar} {count}"));
    }
    lines.join("\n")
}
