//! Config file command handlers (no backend connection needed).

use hyflow_config::{Config, config_path, load_config_or_default, resolve_api_base, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = load_config_or_default();
            let base = resolve_api_base(
                global.api_base.as_deref().or(cfg.api_base.as_deref()),
                None,
            )?;
            if !global.quiet {
                println!("config file:  {}", config_path().display());
                println!("api base:     {base}");
                println!("decision:     {}", cfg.decision_mode.as_str());
                println!("refresh:      {}s", cfg.refresh_interval_secs);
                println!("output:       {}", cfg.output);
            }
            Ok(())
        }

        ConfigCommand::Init => {
            save_config(&Config::default())?;
            if !global.quiet {
                eprintln!("wrote {}", config_path().display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }
    }
}
