//! Multi-Hazard Risk Scoring
//!
//! Normalizes raw hazard observations (earthquakes, active-fire detections,
//! severe-weather alerts) into comparable 0-100 scores and combines them
//! into a weighted composite with a discrete risk level.
//!
//! # Scoring Model
//!
//! ```text
//! composite = w_eq·S_eq + w_fire·S_fire + w_wx·S_wx + w_flood·S_flood + w_heat·S_heat
//! ```
//!
//! | Hazard         | Default weight | Signal |
//! |----------------|----------------|--------|
//! | earthquake     | 0.25           | event frequency + max magnitude |
//! | wildfire       | 0.30           | detection frequency + max FRP + proximity |
//! | severe_weather | 0.20           | highest active alert severity |
//! | flood          | 0.15           | reserved (no data source wired up) |
//! | extreme_heat   | 0.10           | reserved (no data source wired up) |
//!
//! Every scoring function is pure: identical inputs always produce identical
//! output, and an empty (post-filter) record set scores exactly 0.0. A
//! [`RiskScorer`] holds validated weights and is safe to share across worker
//! tasks.

use chrono::{DateTime, Utc};
use geo_filter::GeoTagged;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod scorer;
pub mod weights;

pub use scorer::{seismic_score, weather_alert_score, wildfire_score, RiskScorer};
pub use weights::ScoreWeights;

/// Default search radius in km
pub const DEFAULT_RADIUS_KM: f64 = 500.0;

/// Seismic lookback window in days (10 years)
pub const SEISMIC_LOOKBACK_DAYS: i64 = 3650;

/// Wildfire lookback window in days
pub const WILDFIRE_LOOKBACK_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("hazard weights sum to zero; cannot normalize")]
    DegenerateWeights,
    #[error("negative weight for {0}")]
    NegativeWeight(&'static str),
}

pub type Result<T> = std::result::Result<T, RiskError>;

/// The fixed set of scored hazard kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Earthquake,
    Wildfire,
    SevereWeather,
    Flood,
    ExtremeHeat,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Earthquake,
        HazardKind::Wildfire,
        HazardKind::SevereWeather,
        HazardKind::Flood,
        HazardKind::ExtremeHeat,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HazardKind::Earthquake => "earthquake",
            HazardKind::Wildfire => "wildfire",
            HazardKind::SevereWeather => "severe_weather",
            HazardKind::Flood => "flood",
            HazardKind::ExtremeHeat => "extreme_heat",
        }
    }
}

/// A seismic event from the earthquake catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicEvent {
    pub id: String,
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub magnitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

impl GeoTagged for SeismicEvent {
    fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
    fn observed_at(&self) -> DateTime<Utc> {
        self.time
    }
}

/// A satellite active-fire detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireDetection {
    pub acquired_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Fire radiative power in megawatts
    pub frp_mw: f64,
    pub confidence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness_kelvin: Option<f64>,
}

impl GeoTagged for FireDetection {
    fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
    fn observed_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

/// Alert severity as reported by the weather service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertSeverity {
    Extreme,
    Severe,
    Moderate,
    Minor,
    Unknown,
    /// Any label the feed emits that we do not recognize
    Other,
}

impl<'de> Deserialize<'de> for AlertSeverity {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Unrecognized labels deserialize to Other rather than failing
        let label = String::deserialize(deserializer)?;
        Ok(AlertSeverity::from_label(&label))
    }
}

impl AlertSeverity {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Extreme" => AlertSeverity::Extreme,
            "Severe" => AlertSeverity::Severe,
            "Moderate" => AlertSeverity::Moderate,
            "Minor" => AlertSeverity::Minor,
            "Unknown" => AlertSeverity::Unknown,
            _ => AlertSeverity::Other,
        }
    }

    /// Fixed point value used by the weather-alert score
    pub fn points(&self) -> f64 {
        match self {
            AlertSeverity::Extreme => 100.0,
            AlertSeverity::Severe => 75.0,
            AlertSeverity::Moderate => 50.0,
            AlertSeverity::Minor => 25.0,
            AlertSeverity::Unknown => 10.0,
            AlertSeverity::Other => 0.0,
        }
    }
}

/// An active weather alert, already scoped to the query location by the
/// provider (alerts carry no per-record coordinate usable here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub event: String,
    pub severity: AlertSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onset: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

/// Discrete classification of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskLevel {
    /// Classify a composite score; boundary values belong to the higher tier
    pub fn from_score(composite: f64) -> Self {
        if composite >= 75.0 {
            RiskLevel::Extreme
        } else if composite >= 50.0 {
            RiskLevel::High
        } else if composite >= 25.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Extreme => "Extreme",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-hazard scores feeding the composite, each 0-100.
///
/// Flood and extreme heat have no wired-up data source; they default to 0.0
/// but stay in the signature so an external model can supply them without
/// changing the aggregation contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardScores {
    pub earthquake: f64,
    pub wildfire: f64,
    pub severe_weather: f64,
    pub flood: f64,
    pub extreme_heat: f64,
}

impl HazardScores {
    pub fn new(earthquake: f64, wildfire: f64, severe_weather: f64) -> Self {
        Self {
            earthquake,
            wildfire,
            severe_weather,
            flood: 0.0,
            extreme_heat: 0.0,
        }
    }

    pub fn with_flood(mut self, score: f64) -> Self {
        self.flood = score;
        self
    }

    pub fn with_extreme_heat(mut self, score: f64) -> Self {
        self.extreme_heat = score;
        self
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
}

/// Composite risk assessment for a single location.
///
/// Created fresh per query and immutable once returned; all scores are
/// rounded to one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub composite_score: f64,
    pub risk_level: RiskLevel,
    pub earthquake_score: f64,
    pub wildfire_score: f64,
    pub severe_weather_score: f64,
    pub flood_score: f64,
    pub extreme_heat_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_label_mapping() {
        assert_eq!(AlertSeverity::from_label("Extreme"), AlertSeverity::Extreme);
        assert_eq!(AlertSeverity::from_label("Minor"), AlertSeverity::Minor);
        assert_eq!(AlertSeverity::from_label("Unknown"), AlertSeverity::Unknown);
        assert_eq!(
            AlertSeverity::from_label("Catastrophic"),
            AlertSeverity::Other
        );
        assert_eq!(AlertSeverity::Other.points(), 0.0);
    }

    #[test]
    fn risk_level_boundaries_go_to_higher_tier() {
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Extreme);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(25.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(24.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Extreme);
    }

    #[test]
    fn hazard_scores_lookup_by_kind() {
        let scores = HazardScores::new(10.0, 20.0, 30.0)
            .with_flood(40.0)
            .with_extreme_heat(50.0);
        assert_eq!(scores.get(HazardKind::Earthquake), 10.0);
        assert_eq!(scores.get(HazardKind::Wildfire), 20.0);
        assert_eq!(scores.get(HazardKind::SevereWeather), 30.0);
        assert_eq!(scores.get(HazardKind::Flood), 40.0);
        assert_eq!(scores.get(HazardKind::ExtremeHeat), 50.0);
    }

    #[test]
    fn hazard_kind_names() {
        assert_eq!(HazardKind::SevereWeather.name(), "severe_weather");
        assert_eq!(HazardKind::ALL.len(), 5);
    }
}
