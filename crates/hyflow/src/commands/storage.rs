//! Storage tank command handlers.

use hyflow_core::StorageTank;
use tabled::Tabled;

use crate::cli::{StorageArgs, StorageCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output::{print_output, render_list, render_single};

use super::util;

#[derive(Tabled)]
struct TankRow {
    #[tabled(rename = "TANK")]
    id: String,
    #[tabled(rename = "LEVEL KG")]
    level: String,
    #[tabled(rename = "CAPACITY KG")]
    capacity: String,
    #[tabled(rename = "FILL")]
    fill: String,
}

fn to_row(tank: &StorageTank) -> TankRow {
    TankRow {
        id: tank.tank_id.clone(),
        level: format!("{:.0}", tank.level_kg),
        capacity: format!("{:.0}", tank.capacity_kg),
        fill: format!("{:.0}%", tank.fill_ratio() * 100.0),
    }
}

pub async fn handle(args: StorageArgs, ctx: &Context) -> Result<(), CliError> {
    match args.command {
        StorageCommand::List => {
            let tanks: Vec<StorageTank> =
                util::into_data(ctx.client.storage_all().await.decode())?;
            let rendered = render_list(ctx.format, &tanks, to_row, |t| t.tank_id.clone());
            print_output(&rendered, ctx.quiet);
            Ok(())
        }

        StorageCommand::Add { body } => {
            let body = util::parse_body(&body)?;
            let created = util::into_data(ctx.client.storage_add(&body).await)?;
            print_single(ctx, &created);
            Ok(())
        }

        StorageCommand::Update { id, body } => {
            let body = util::parse_body(&body)?;
            let updated = util::into_data(ctx.client.storage_update(&id, &body).await)?;
            print_single(ctx, &updated);
            Ok(())
        }
    }
}

fn print_single(ctx: &Context, value: &serde_json::Value) {
    let rendered = render_single(
        ctx.format,
        value,
        crate::output::render_json_pretty,
        ToString::to_string,
    );
    print_output(&rendered, ctx.quiet);
}
