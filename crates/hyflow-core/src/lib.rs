//! Reactive synchronization layer for the hydrogen dashboard.
//!
//! Sits between [`hyflow-api`](hyflow_api) and whatever renders the data
//! (the bundled CLI, a TUI, an exporter). Three building blocks:
//!
//! - [`SyncUnit`] keeps one resource fresh by polling a producer and
//!   broadcasting [`SyncState`] snapshots over a watch channel.
//! - [`MutationUnit`] runs a single write and reports its outcome through
//!   the same state shape.
//! - [`TelemetryFeed`] ingests the live vehicle stream and republishes
//!   whole-fleet snapshots plus a derived map viewport.
//!
//! Pure fleet arithmetic lives in [`fleet`] so it can be tested without a
//! runtime.

pub mod config;
pub mod error;
pub mod fleet;
pub mod model;
pub mod sync;
pub mod telemetry;

pub use config::DashboardConfig;
pub use error::CoreError;
pub use fleet::{FleetSummary, RouteSelection, capacity_for, efficiency_histogram, summarize};
pub use model::{
    DemandPrediction, ProductionUnit, RecommendedRoute, StorageTank, TransportMode, Vehicle,
};
pub use sync::{MutationUnit, Producer, SyncState, SyncUnit};
pub use telemetry::{DEFAULT_MAP_CENTER, SnapshotStream, TelemetryFeed};
