use serde::{Deserialize, Serialize};
use strum::Display;

/// How a vehicle moves hydrogen. The wire format uses lowercase names,
/// including the two-word `"cargo ship"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransportMode {
    Truck,
    Pipeline,
    Tanker,
    #[serde(rename = "cargo ship")]
    #[strum(serialize = "cargo ship")]
    CargoShip,
    /// Any mode this client does not know about yet.
    #[serde(other, rename = "unknown")]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl Default for TransportMode {
    fn default() -> Self {
        Self::Truck
    }
}

/// One vehicle row from the fleet endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub mode: TransportMode,
    #[serde(default)]
    pub status: String,
    /// Current payload in kilograms. Older backend builds call this `load`.
    #[serde(default, alias = "load")]
    pub load_kg: f64,
    /// `[lat, lon]` pairs; absent while a vehicle is unassigned.
    #[serde(default)]
    pub current_location: Option<[f64; 2]>,
    #[serde(default)]
    pub destination: Option<[f64; 2]>,
    /// 0-100 score computed server-side; absent until the first optimizer run.
    #[serde(default)]
    pub efficiency_score: Option<f64>,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub recommended_route: Option<RecommendedRoute>,
}

/// Route suggestion attached to a vehicle by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RecommendedRoute {
    /// Polyline as `[lat, lon]` pairs.
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub duration_min: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cargo_ship_round_trips_with_a_space() {
        let mode: TransportMode = serde_json::from_str("\"cargo ship\"").unwrap();
        assert_eq!(mode, TransportMode::CargoShip);
        assert_eq!(mode.to_string(), "cargo ship");
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"cargo ship\"");
    }

    #[test]
    fn unrecognized_mode_falls_back_to_unknown() {
        let mode: TransportMode = serde_json::from_str("\"zeppelin\"").unwrap();
        assert_eq!(mode, TransportMode::Unknown);
    }

    #[test]
    fn vehicle_tolerates_sparse_rows() {
        let v: Vehicle = serde_json::from_value(serde_json::json!({
            "vehicle_id": "H2-TRK-001",
            "mode": "truck",
            "load": 12000.0
        }))
        .unwrap();
        assert_eq!(v.load_kg, 12000.0);
        assert_eq!(v.efficiency_score, None);
        assert_eq!(v.current_location, None);
    }
}
