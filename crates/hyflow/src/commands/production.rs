//! Production unit command handlers.

use hyflow_core::{MutationUnit, ProductionUnit};
use serde_json::json;
use tabled::Tabled;

use crate::cli::{ProductionArgs, ProductionCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_output, render_list, render_single};

use super::util;

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "UNIT")]
    id: String,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "OUTPUT KG/D")]
    output: String,
    #[tabled(rename = "CAPACITY KG/D")]
    capacity: String,
    #[tabled(rename = "UTILIZATION")]
    utilization: String,
}

fn to_row(unit: &ProductionUnit) -> UnitRow {
    let utilization = if unit.max_capacity_kg_per_day > 0.0 {
        format!(
            "{:.0}%",
            100.0 * unit.current_output_kg_per_day / unit.max_capacity_kg_per_day
        )
    } else {
        "-".into()
    };
    UnitRow {
        id: unit.unit_id.clone(),
        kind: unit.kind.clone().unwrap_or_else(|| "-".into()),
        output: format!("{:.0}", unit.current_output_kg_per_day),
        capacity: format!("{:.0}", unit.max_capacity_kg_per_day),
        utilization,
    }
}

pub async fn handle(args: ProductionArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        ProductionCommand::List => {
            let units: Vec<ProductionUnit> =
                util::into_data(ctx.client.production_all().await.decode())?;
            let rendered = render_list(ctx.format, &units, to_row, |u| u.unit_id.clone());
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        ProductionCommand::Add { body } => {
            let body = util::parse_body(&body)?;
            let created = util::into_data(ctx.client.production_add(&body).await)?;
            let rendered = render_single(
                ctx.format,
                &created,
                crate::output::render_json_pretty,
                ToString::to_string,
            );
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        ProductionCommand::SetOutput { id, output } => {
            let client = ctx.client.clone();
            let unit = MutationUnit::new(move |(id, output): (String, f64)| {
                let client = client.clone();
                async move {
                    client
                        .production_update_output(
                            &id,
                            &json!({ "current_output_kg_per_day": output }),
                        )
                        .await
                }
            });
            let result = unit.execute((id, output)).await;
            let updated = util::into_data(result)?;
            if !ctx.quiet {
                let rendered = render_single(
                    ctx.format,
                    &updated,
                    crate::output::render_json_pretty,
                    ToString::to_string,
                );
                print_output(&rendered, ctx.quiet);
            }
            Ok(())
        }
    }
}
