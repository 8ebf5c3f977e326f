use serde::{Deserialize, Serialize};

/// A production site reported by `/production/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionUnit {
    #[serde(default)]
    pub unit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Electrolysis method, e.g. `"PEM"` or `"alkaline"`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub max_capacity_kg_per_day: f64,
    #[serde(default)]
    pub current_output_kg_per_day: f64,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
}

/// A storage tank reported by `/storage/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageTank {
    #[serde(default)]
    pub tank_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity_kg: f64,
    #[serde(default)]
    pub level_kg: f64,
    #[serde(default)]
    pub location: Option<[f64; 2]>,
}

impl StorageTank {
    /// Fill ratio in `0.0..=1.0`; zero-capacity tanks read as empty.
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity_kg <= 0.0 {
            0.0
        } else {
            (self.level_kg / self.capacity_kg).clamp(0.0, 1.0)
        }
    }
}

/// Output of the demand-prediction model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandPrediction {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub predicted_demand_kg: f64,
    #[serde(default)]
    pub eff_score: f64,
}
