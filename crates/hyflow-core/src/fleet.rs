//! Pure fleet arithmetic: capacity lookup, health summary, efficiency
//! histogram and the per-vehicle route view. No I/O, no runtime.

use serde::Serialize;

use crate::model::{TransportMode, Vehicle};

/// Capacity assumed for modes we have no table entry for.
pub const DEFAULT_CAPACITY_KG: f64 = 30_000.0;

/// Nominal payload capacity in kilograms for a transport mode.
#[must_use]
pub const fn capacity_for(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Truck | TransportMode::Unknown => DEFAULT_CAPACITY_KG,
        TransportMode::Pipeline => 500_000.0,
        TransportMode::Tanker => 100_000.0,
        TransportMode::CargoShip => 1_000_000.0,
    }
}

/// Fleet health counters shown in the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Vehicles with an efficiency score strictly above 80.
    pub high_efficiency: usize,
    /// Vehicles loaded strictly beyond their mode capacity.
    pub overloaded: usize,
    /// Vehicles currently flagged for maintenance.
    pub maintenance: usize,
}

/// Counts high-efficiency, overloaded and in-maintenance vehicles in one
/// pass. A missing efficiency score counts as zero, so it is never "high".
#[must_use]
pub fn summarize(fleet: &[Vehicle]) -> FleetSummary {
    let mut summary = FleetSummary::default();
    for vehicle in fleet {
        if vehicle.efficiency_score.unwrap_or(0.0) > 80.0 {
            summary.high_efficiency += 1;
        }
        if vehicle.load_kg > capacity_for(vehicle.mode) {
            summary.overloaded += 1;
        }
        if vehicle.status == "maintenance" {
            summary.maintenance += 1;
        }
    }
    summary
}

/// Number of histogram buckets; each spans 20 efficiency points.
pub const HISTOGRAM_BUCKETS: usize = 6;

/// Buckets vehicle efficiency scores into `[0-20), [20-40), .. [100-..]`.
/// Missing scores land in the first bucket; scores at or above 100 land in
/// the last.
#[must_use]
pub fn efficiency_histogram(fleet: &[Vehicle]) -> [usize; HISTOGRAM_BUCKETS] {
    let mut buckets = [0usize; HISTOGRAM_BUCKETS];
    for vehicle in fleet {
        let score = vehicle.efficiency_score.unwrap_or(0.0).max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let idx = ((score / 20.0).floor() as usize).min(HISTOGRAM_BUCKETS - 1);
        buckets[idx] += 1;
    }
    buckets
}

/// Everything the map needs to draw one vehicle's suggested route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteSelection {
    pub source: Option<[f64; 2]>,
    pub destination: Option<[f64; 2]>,
    pub geometry: Option<Vec<[f64; 2]>>,
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
}

impl RouteSelection {
    /// Projects the route-relevant fields out of a vehicle row.
    #[must_use]
    pub fn for_vehicle(vehicle: &Vehicle) -> Self {
        let route = vehicle.recommended_route.as_ref();
        Self {
            source: vehicle.current_location,
            destination: vehicle.destination,
            geometry: route.and_then(|r| r.geometry.clone()),
            distance_km: route.and_then(|r| r.distance_km),
            duration_min: route.and_then(|r| r.duration_min),
        }
    }
}
