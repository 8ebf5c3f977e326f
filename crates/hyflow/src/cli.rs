//! Clap derive structures for the `hyflow` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hyflow -- dashboard CLI for a hydrogen production network
#[derive(Debug, Parser)]
#[command(
    name = "hyflow",
    version,
    about = "Monitor hydrogen production, storage and transport from the command line",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// API base URL, including the /api prefix
    #[arg(long, short = 'b', env = "HYFLOW_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "HYFLOW_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Decision engine selector, mirrored from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecisionModeArg {
    Ml,
    Rule,
}

impl From<DecisionModeArg> for hyflow_api::DecisionMode {
    fn from(arg: DecisionModeArg) -> Self {
        match arg {
            DecisionModeArg::Ml => Self::Ml,
            DecisionModeArg::Rule => Self::Rule,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect and manage production units
    #[command(alias = "prod", alias = "p")]
    Production(ProductionArgs),

    /// Inspect and manage storage tanks
    #[command(alias = "st")]
    Storage(StorageArgs),

    /// Inspect the transport fleet
    #[command(alias = "tr", alias = "t")]
    Transport(TransportArgs),

    /// Run the prediction models
    #[command(alias = "pred")]
    Prediction(PredictionArgs),

    /// Network-wide dashboard summary
    Dashboard,

    /// Follow the live vehicle telemetry stream
    Watch(WatchArgs),

    /// Manage the hyflow configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Production ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductionArgs {
    #[command(subcommand)]
    pub command: ProductionCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductionCommand {
    /// List all production units
    #[command(alias = "ls")]
    List,

    /// Register a new production unit (JSON body or @file)
    Add {
        /// Unit definition as inline JSON or @path/to/file.json
        body: String,
    },

    /// Set the current output of a unit, in kg/day
    SetOutput {
        /// Unit identifier
        id: String,
        /// New output in kg per day
        output: f64,
    },
}

// ── Storage ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StorageArgs {
    #[command(subcommand)]
    pub command: StorageCommand,
}

#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// List all storage tanks
    #[command(alias = "ls")]
    List,

    /// Register a new tank (JSON body or @file)
    Add { body: String },

    /// Update a tank's level or metadata (JSON body or @file)
    Update { id: String, body: String },
}

// ── Transport ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TransportArgs {
    #[command(subcommand)]
    pub command: TransportCommand,
}

#[derive(Debug, Subcommand)]
pub enum TransportCommand {
    /// List the fleet with per-vehicle recommendations
    #[command(alias = "ls")]
    Fleet {
        /// Decision engine to enrich the listing with
        #[arg(long, value_enum)]
        mode: Option<DecisionModeArg>,

        /// Keep the listing synchronized, re-rendering on refresh
        #[arg(long, short = 'f')]
        follow: bool,

        /// Refresh cadence in seconds when following
        #[arg(long, default_value = "10")]
        interval: u64,
    },

    /// Fleet health counters (high efficiency / overloaded / maintenance)
    Summary {
        #[arg(long, value_enum)]
        mode: Option<DecisionModeArg>,
    },

    /// Efficiency score distribution in 20-point buckets
    Histogram {
        #[arg(long, value_enum)]
        mode: Option<DecisionModeArg>,
    },

    /// Show the recommended route for one vehicle
    Route {
        /// Vehicle identifier
        vehicle_id: String,
        #[arg(long, value_enum)]
        mode: Option<DecisionModeArg>,
    },

    /// Register a new vehicle (JSON body or @file)
    AddVehicle { body: String },

    /// Pick the best vehicle for a delivery
    Optimize {
        /// Destination latitude
        #[arg(long)]
        lat: f64,
        /// Destination longitude
        #[arg(long)]
        lon: f64,
        /// Load to move, in kg
        #[arg(long)]
        load: f64,
    },

    /// Assign a vehicle to a delivery (JSON body or @file)
    Assign { body: String },

    /// Retrain the efficiency model
    Train,
}

// ── Prediction ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PredictionArgs {
    #[command(subcommand)]
    pub command: PredictionCommand,
}

#[derive(Debug, Subcommand)]
pub enum PredictionCommand {
    /// Regional demand forecast
    Demand {
        /// Score an ad-hoc scenario instead of the stored forecast
        #[arg(long)]
        region: Option<String>,
        #[arg(long, default_value = "0.0")]
        weather_risk: f64,
        #[arg(long, default_value = "0.0")]
        traffic_score: f64,
    },

    /// Renewable energy availability forecast
    Renewable,

    /// Storage tanks predicted to run dry or overflow
    Alerts,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many snapshots (default: run until interrupted)
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the active configuration and where it came from
    Show,

    /// Write a config file with the current defaults
    Init,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
