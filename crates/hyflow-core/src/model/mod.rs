//! Wire-facing data model for the dashboard backend.
//!
//! Every type here deserializes leniently: the backend grows fields faster
//! than it versions its API, so unknown fields are ignored and most scalar
//! fields carry defaults.

mod facility;
mod vehicle;

pub use facility::{DemandPrediction, ProductionUnit, StorageTank};
pub use vehicle::{RecommendedRoute, TransportMode, Vehicle};
