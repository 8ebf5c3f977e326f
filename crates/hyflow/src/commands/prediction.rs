//! Prediction model command handlers.

use hyflow_core::DemandPrediction;

use crate::cli::{PredictionArgs, PredictionCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_output, render_single};

use super::util;

pub async fn handle(args: PredictionArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        PredictionCommand::Demand {
            region: Some(region),
            weather_risk,
            traffic_score,
        } => {
            for (field, value) in [("weather-risk", weather_risk), ("traffic-score", traffic_score)]
            {
                if !(0.0..=1.0).contains(&value) {
                    return Err(CliError::Validation {
                        field: field.into(),
                        reason: format!("must be within 0.0..=1.0, got {value}"),
                    });
                }
            }
            let prediction: DemandPrediction = util::into_data(
                ctx.client
                    .demand_predict(&region, weather_risk, traffic_score)
                    .await
                    .decode(),
            )?;
            let rendered = render_single(
                ctx.format,
                &prediction,
                |p| {
                    format!(
                        "region:    {}\ndemand:    {:.0} kg\neff score: {:.1}",
                        p.region.as_deref().unwrap_or(&region),
                        p.predicted_demand_kg,
                        p.eff_score
                    )
                },
                |p| format!("{:.0}", p.predicted_demand_kg),
            );
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        PredictionCommand::Demand { region: None, .. } => {
            print_raw(ctx, util::into_data(ctx.client.prediction_demand().await)?);
            Ok(())
        }

        PredictionCommand::Renewable => {
            print_raw(ctx, util::into_data(ctx.client.prediction_renewable().await)?);
            Ok(())
        }

        PredictionCommand::Alerts => {
            print_raw(
                ctx,
                util::into_data(ctx.client.prediction_storage_alerts().await)?,
            );
            Ok(())
        }
    }
}

fn print_raw(ctx: &Context, value: serde_json::Value) {
    let rendered = render_single(
        ctx.format,
        &value,
        crate::output::render_json_pretty,
        ToString::to_string,
    );
    print_output(&rendered, ctx.quiet);
}
