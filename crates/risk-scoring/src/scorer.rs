//! Per-hazard scoring functions and composite aggregation
//!
//! Inputs arrive already distance/recency filtered (see `geo_filter`);
//! each function normalizes its factors into 0-100 and an empty input
//! always scores exactly 0.0.

use crate::{
    CompositeResult, FireDetection, HazardKind, HazardScores, RiskLevel, ScoreWeights,
    SeismicEvent, WeatherAlert,
};
use geo_filter::Within;
use tracing::debug;

/// Event count at which the seismic frequency factor saturates
const SEISMIC_FREQUENCY_SATURATION: f64 = 50.0;
/// Magnitude at which the seismic magnitude factor saturates
const SEISMIC_MAGNITUDE_SATURATION: f64 = 7.0;

/// Detection count at which the wildfire frequency factor saturates
const WILDFIRE_FREQUENCY_SATURATION: f64 = 20.0;
/// Fire radiative power (MW) at which the intensity factor saturates
const WILDFIRE_FRP_SATURATION: f64 = 500.0;

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Seismic risk score (0-100) from events within radius and lookback.
///
/// 0.6 × frequency (saturates at 50 events) + 0.4 × max magnitude
/// (saturates at magnitude 7), clamped to 0-100. The floor matters:
/// catalogs report negative magnitudes for microquakes.
pub fn seismic_score(events: &[Within<SeismicEvent>]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }

    let count = events.len() as f64;
    let max_magnitude = events
        .iter()
        .map(|e| e.record.magnitude)
        .fold(f64::NEG_INFINITY, f64::max);

    let frequency_score = (count / SEISMIC_FREQUENCY_SATURATION).min(1.0) * 100.0;
    let magnitude_score = (max_magnitude / SEISMIC_MAGNITUDE_SATURATION).min(1.0) * 100.0;

    let score = 0.6 * frequency_score + 0.4 * magnitude_score;

    debug!(
        "seismic: {:.1} (n={}, freq={:.1}, max_mag={:.1}, mag_score={:.1})",
        score, events.len(), frequency_score, max_magnitude, magnitude_score
    );

    score.clamp(0.0, 100.0)
}

/// Wildfire risk score (0-100) from detections within radius and lookback.
///
/// 0.4 × frequency (saturates at 20 detections) + 0.3 × max FRP (saturates
/// at 500 MW) + 0.3 × proximity (linear decay from 100 at the center to 0
/// at the radius), clamped to 100. Detections beyond the radius were
/// already excluded by the filter and never penalize negatively.
pub fn wildfire_score(fires: &[Within<FireDetection>], radius_km: f64) -> f64 {
    if fires.is_empty() {
        return 0.0;
    }

    let count = fires.len() as f64;
    let max_frp = fires
        .iter()
        .map(|f| f.record.frp_mw)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_distance = fires
        .iter()
        .map(|f| f.distance_km)
        .fold(f64::INFINITY, f64::min);

    let frequency_score = (count / WILDFIRE_FREQUENCY_SATURATION).min(1.0) * 100.0;
    let intensity_score = (max_frp / WILDFIRE_FRP_SATURATION).min(1.0) * 100.0;
    let proximity_score = (100.0 - (min_distance / radius_km * 100.0)).max(0.0);

    let score = 0.4 * frequency_score + 0.3 * intensity_score + 0.3 * proximity_score;

    debug!(
        "wildfire: {:.1} (n={}, freq={:.1}, max_frp={:.1}, prox={:.1})",
        score, fires.len(), frequency_score, max_frp, proximity_score
    );

    score.min(100.0)
}

/// Severe-weather risk score (0-100) from active alerts.
///
/// The maximum severity point value across all alerts, not an average: one
/// extreme alert dominates. Alerts are already scoped to the location by
/// the provider.
pub fn weather_alert_score(alerts: &[WeatherAlert]) -> f64 {
    alerts
        .iter()
        .map(|a| a.severity.points())
        .fold(0.0, f64::max)
}

/// Composite risk scorer holding a validated weight configuration.
///
/// Pure and immutable after construction; clone it or share one instance
/// across any number of concurrent assessments.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    weights: ScoreWeights,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(ScoreWeights::default())
    }
}

impl RiskScorer {
    /// Weight validation happens in [`ScoreWeights`]; by the time a scorer
    /// exists its weights sum to 1.0.
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Weighted composite of the five per-hazard scores, rounded to one
    /// decimal place and classified into a [`RiskLevel`].
    pub fn composite(&self, scores: &HazardScores) -> CompositeResult {
        let composite: f64 = HazardKind::ALL
            .iter()
            .map(|&kind| self.weights.get(kind) * scores.get(kind))
            .sum();

        let composite_score = round1(composite);
        let risk_level = RiskLevel::from_score(composite_score);

        debug!(
            "composite: {:.1} ({}) from eq={:.1} fire={:.1} wx={:.1}",
            composite_score, risk_level, scores.earthquake, scores.wildfire, scores.severe_weather
        );

        CompositeResult {
            composite_score,
            risk_level,
            earthquake_score: round1(scores.earthquake),
            wildfire_score: round1(scores.wildfire),
            severe_weather_score: round1(scores.severe_weather),
            flood_score: round1(scores.flood),
            extreme_heat_score: round1(scores.extreme_heat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertSeverity;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn quake(magnitude: f64) -> Within<SeismicEvent> {
        Within {
            record: SeismicEvent {
                id: format!("us-m{magnitude}"),
                time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                latitude: 39.7,
                longitude: -105.0,
                depth_km: 10.0,
                magnitude,
                place: None,
            },
            distance_km: 50.0,
        }
    }

    fn fire(frp_mw: f64, distance_km: f64) -> Within<FireDetection> {
        Within {
            record: FireDetection {
                acquired_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                latitude: 39.7,
                longitude: -105.0,
                frp_mw,
                confidence: "h".to_string(),
                brightness_kelvin: None,
            },
            distance_km,
        }
    }

    fn alert(severity: AlertSeverity) -> WeatherAlert {
        WeatherAlert {
            event: "Test Alert".to_string(),
            severity,
            headline: None,
            description: None,
            onset: None,
            expires: None,
        }
    }

    #[test]
    fn empty_inputs_score_exactly_zero() {
        assert_eq!(seismic_score(&[]), 0.0);
        assert_eq!(wildfire_score(&[], 500.0), 0.0);
        assert_eq!(weather_alert_score(&[]), 0.0);
    }

    #[test]
    fn seismic_formula() {
        // 10 events, max magnitude 5.0:
        // freq = 10/50 * 100 = 20, mag = 5/7 * 100
        let events: Vec<_> = (0..10).map(|_| quake(5.0)).collect();
        let expected = 0.6 * 20.0 + 0.4 * (5.0 / 7.0 * 100.0);
        assert!((seismic_score(&events) - expected).abs() < 1e-9);
    }

    #[test]
    fn seismic_saturates_at_100() {
        // 1000 events at magnitude 9 still yields 100, not more
        let events: Vec<_> = (0..1000).map(|_| quake(9.0)).collect();
        assert_eq!(seismic_score(&events), 100.0);
    }

    #[test]
    fn negative_magnitude_floors_at_zero() {
        // A lone microquake must not drag the score below the 0-100 range
        assert_eq!(seismic_score(&[quake(-1.0)]), 0.0);

        // A negative-magnitude event alongside a real one leaves the max
        // untouched
        let mixed = vec![quake(-0.5), quake(5.0)];
        let expected = 0.6 * (2.0 / 50.0 * 100.0) + 0.4 * (5.0 / 7.0 * 100.0);
        assert!((seismic_score(&mixed) - expected).abs() < 1e-9);
    }

    #[test]
    fn wildfire_formula() {
        // 5 fires, max FRP 250 MW, closest at 100 km of a 500 km radius:
        // freq = 25, intensity = 50, proximity = 80
        let fires: Vec<_> = (0..5).map(|_| fire(250.0, 100.0)).collect();
        let expected = 0.4 * 25.0 + 0.3 * 50.0 + 0.3 * 80.0;
        assert!((wildfire_score(&fires, 500.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn wildfire_proximity_endpoints() {
        // A detection at the center contributes proximity 100
        let at_center = vec![fire(0.0, 0.0)];
        let s = wildfire_score(&at_center, 500.0);
        assert!((s - (0.4 * 5.0 + 0.3 * 100.0)).abs() < 1e-9);

        // A detection exactly at the radius contributes proximity 0
        let at_edge = vec![fire(0.0, 500.0)];
        let s = wildfire_score(&at_edge, 500.0);
        assert!((s - 0.4 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn weather_score_is_max_not_average() {
        let alerts = vec![alert(AlertSeverity::Moderate), alert(AlertSeverity::Extreme)];
        assert_eq!(weather_alert_score(&alerts), 100.0);

        let alerts = vec![alert(AlertSeverity::Minor), alert(AlertSeverity::Unknown)];
        assert_eq!(weather_alert_score(&alerts), 25.0);
    }

    #[test]
    fn composite_round_trips_default_weights() {
        let scorer = RiskScorer::default();
        let result = scorer.composite(&HazardScores::new(100.0, 0.0, 0.0));
        assert_eq!(result.composite_score, 25.0);
        assert_eq!(result.risk_level, RiskLevel::Moderate);
        assert_eq!(result.earthquake_score, 100.0);
        assert_eq!(result.flood_score, 0.0);
    }

    #[test]
    fn composite_rounds_to_one_decimal() {
        let scorer = RiskScorer::default();
        let result = scorer.composite(&HazardScores::new(33.33, 33.33, 33.33));
        // 0.75 * 33.33 = 24.9975 -> 25.0
        assert_eq!(result.composite_score, 25.0);
    }

    #[test]
    fn composite_uses_optional_hazard_scores() {
        let scorer = RiskScorer::default();
        let scores = HazardScores::new(0.0, 0.0, 0.0)
            .with_flood(100.0)
            .with_extreme_heat(100.0);
        let result = scorer.composite(&scores);
        // 0.15 * 100 + 0.10 * 100
        assert_eq!(result.composite_score, 25.0);
        assert_eq!(result.flood_score, 100.0);
    }

    #[test]
    fn renormalized_weights_flow_into_composite() {
        // earthquake:wildfire = 1:1, everything else 0 -> effective 0.5 each
        let weights = ScoreWeights::new(1.0, 1.0, 0.0, 0.0, 0.0).unwrap();
        let scorer = RiskScorer::new(weights);
        let result = scorer.composite(&HazardScores::new(100.0, 50.0, 0.0));
        assert_eq!(result.composite_score, 75.0);
        assert_eq!(result.risk_level, RiskLevel::Extreme);
    }

    proptest! {
        #[test]
        fn seismic_score_in_range(n in 0usize..200, mag in -3.0f64..10.0) {
            let events: Vec<_> = (0..n).map(|_| quake(mag)).collect();
            let s = seismic_score(&events);
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn seismic_monotone_in_count(n in 1usize..100, mag in 0.0f64..10.0) {
            let smaller: Vec<_> = (0..n).map(|_| quake(mag)).collect();
            let larger: Vec<_> = (0..n + 1).map(|_| quake(mag)).collect();
            prop_assert!(seismic_score(&larger) >= seismic_score(&smaller));
        }

        #[test]
        fn seismic_monotone_in_magnitude(n in 1usize..60, mag in -3.0f64..9.0) {
            let weaker: Vec<_> = (0..n).map(|_| quake(mag)).collect();
            let stronger: Vec<_> = (0..n).map(|_| quake(mag + 0.5)).collect();
            prop_assert!(seismic_score(&stronger) >= seismic_score(&weaker));
        }

        #[test]
        fn wildfire_score_in_range(
            n in 0usize..50,
            frp in 0.0f64..1000.0,
            dist in 0.0f64..500.0,
        ) {
            let fires: Vec<_> = (0..n).map(|_| fire(frp, dist)).collect();
            let s = wildfire_score(&fires, 500.0);
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn composite_level_matches_score(
            eq in 0.0f64..=100.0,
            fire_s in 0.0f64..=100.0,
            wx in 0.0f64..=100.0,
        ) {
            let scorer = RiskScorer::default();
            let result = scorer.composite(&HazardScores::new(eq, fire_s, wx));
            prop_assert!((0.0..=100.0).contains(&result.composite_score));
            prop_assert_eq!(result.risk_level, RiskLevel::from_score(result.composite_score));
        }
    }
}
