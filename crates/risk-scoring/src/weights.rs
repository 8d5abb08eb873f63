//! Hazard weight configuration
//!
//! Weights must sum to 1.0. A non-unit sum is renormalized proportionally at
//! construction (logged, non-fatal); a zero sum is rejected so NaN can never
//! reach a composite score.

use crate::{HazardKind, Result, RiskError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default weights for each hazard type (sum = 1.0)
pub const DEFAULT_EARTHQUAKE_WEIGHT: f64 = 0.25;
pub const DEFAULT_WILDFIRE_WEIGHT: f64 = 0.30;
pub const DEFAULT_SEVERE_WEATHER_WEIGHT: f64 = 0.20;
pub const DEFAULT_FLOOD_WEIGHT: f64 = 0.15;
pub const DEFAULT_EXTREME_HEAT_WEIGHT: f64 = 0.10;

/// Relative tolerance on the weight sum before renormalizing
const SUM_TOLERANCE: f64 = 1e-8;

/// Per-hazard composite weights, validated at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub earthquake: f64,
    pub wildfire: f64,
    pub severe_weather: f64,
    pub flood: f64,
    pub extreme_heat: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            earthquake: DEFAULT_EARTHQUAKE_WEIGHT,
            wildfire: DEFAULT_WILDFIRE_WEIGHT,
            severe_weather: DEFAULT_SEVERE_WEATHER_WEIGHT,
            flood: DEFAULT_FLOOD_WEIGHT,
            extreme_heat: DEFAULT_EXTREME_HEAT_WEIGHT,
        }
    }
}

impl ScoreWeights {
    /// Build a validated weight set.
    ///
    /// Negative weights and a zero sum are configuration errors. A sum that
    /// is merely not 1.0 is rescaled by `1/sum`, preserving relative ratios.
    pub fn new(
        earthquake: f64,
        wildfire: f64,
        severe_weather: f64,
        flood: f64,
        extreme_heat: f64,
    ) -> Result<Self> {
        let raw = Self {
            earthquake,
            wildfire,
            severe_weather,
            flood,
            extreme_heat,
        };
        raw.normalized()
    }

    /// Validate and renormalize an existing weight set
    pub fn normalized(self) -> Result<Self> {
        for kind in HazardKind::ALL {
            if self.get(kind) < 0.0 {
                return Err(RiskError::NegativeWeight(kind.name()));
            }
        }

        let total = self.sum();
        if total.abs() < SUM_TOLERANCE {
            return Err(RiskError::DegenerateWeights);
        }

        if (total - 1.0).abs() <= SUM_TOLERANCE {
            return Ok(self);
        }

        warn!("hazard weights sum to {total:.4}, renormalizing to 1.0");
        Ok(Self {
            earthquake: self.earthquake / total,
            wildfire: self.wildfire / total,
            severe_weather: self.severe_weather / total,
            flood: self.flood / total,
            extreme_heat: self.extreme_heat / total,
        })
    }

    pub fn get(&self, kind: HazardKind) -> f64 {
        match kind {
            HazardKind::Earthquake => self.earthquake,
            HazardKind::Wildfire => self.wildfire,
            HazardKind::SevereWeather => self.severe_weather,
            HazardKind::Flood => self.flood,
            HazardKind::ExtremeHeat => self.extreme_heat,
        }
    }

    pub fn sum(&self) -> f64 {
        self.earthquake + self.wildfire + self.severe_weather + self.flood + self.extreme_heat
    }
}
