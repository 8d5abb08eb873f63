//! Assessment orchestration
//!
//! Fetches the three hazard feeds for a location, filters, scores, and
//! aggregates. Provider failures are recovered here by substituting an
//! empty record set (logged); from the score alone, an upstream outage and
//! a genuinely hazard-free location look the same.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use geo_filter::{filter_within, GeoPoint};
use risk_scoring::{
    seismic_score, weather_alert_score, wildfire_score, CompositeResult, HazardScores,
    RiskLevel, SEISMIC_LOOKBACK_DAYS, WILDFIRE_LOOKBACK_DAYS,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;
use hazard_providers::AlertArea;

/// Raw record counts per upstream source, echoed to the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SourceCounts {
    pub earthquakes: usize,
    pub wildfires: usize,
    pub weather_alerts: usize,
}

/// A scored location with its source counts
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub result: CompositeResult,
    pub data_sources: SourceCounts,
}

/// Assess a single location: concurrent fetch, filter, score, aggregate.
///
/// `now` anchors both the provider request windows and the lookback filter,
/// keeping the whole pipeline deterministic for a given input.
pub async fn assess_location(
    state: &AppState,
    center: GeoPoint,
    radius_km: f64,
    now: DateTime<Utc>,
) -> Assessment {
    let alert_area = AlertArea::Point(center);
    let (earthquakes, fires, alerts) = tokio::join!(
        state.usgs.earthquakes_near(center, radius_km, now),
        state
            .firms
            .fires_near(center, radius_km, WILDFIRE_LOOKBACK_DAYS as u32),
        state.nws.active_alerts(&alert_area),
    );

    // Provider failure and "no hazards" both score as empty
    let earthquakes = earthquakes.unwrap_or_else(|e| {
        warn!("USGS fetch failed, scoring with empty set: {e}");
        Vec::new()
    });
    let fires = fires.unwrap_or_else(|e| {
        warn!("FIRMS fetch failed, scoring with empty set: {e}");
        Vec::new()
    });
    let alerts = alerts.unwrap_or_else(|e| {
        warn!("NWS fetch failed, scoring with empty set: {e}");
        Vec::new()
    });

    let data_sources = SourceCounts {
        earthquakes: earthquakes.len(),
        wildfires: fires.len(),
        weather_alerts: alerts.len(),
    };

    let nearby_quakes = filter_within(
        earthquakes,
        center,
        radius_km,
        Duration::days(SEISMIC_LOOKBACK_DAYS),
        now,
    );
    let nearby_fires = filter_within(
        fires,
        center,
        radius_km,
        Duration::days(WILDFIRE_LOOKBACK_DAYS),
        now,
    );

    let scores = HazardScores::new(
        seismic_score(&nearby_quakes),
        wildfire_score(&nearby_fires, radius_km),
        weather_alert_score(&alerts),
    );

    Assessment {
        result: state.scorer.composite(&scores),
        data_sources,
    }
}

/// Assess many locations concurrently. Each location is independent; the
/// caller decides how failures surface (the HTTP layer fails the whole
/// batch rather than return a partial distribution).
pub async fn assess_portfolio(
    state: &AppState,
    locations: &[(GeoPoint, f64)],
    now: DateTime<Utc>,
) -> Vec<Assessment> {
    let futures: Vec<_> = locations
        .iter()
        .map(|&(center, radius_km)| assess_location(state, center, radius_km, now))
        .collect();
    join_all(futures).await
}

/// One entry in the portfolio ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRisk {
    pub latitude: f64,
    pub longitude: f64,
    pub composite_score: f64,
    pub risk_level: RiskLevel,
}

/// Counts per risk level across an assessed portfolio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    #[serde(rename = "Extreme")]
    pub extreme: usize,
    #[serde(rename = "High")]
    pub high: usize,
    #[serde(rename = "Moderate")]
    pub moderate: usize,
    #[serde(rename = "Low")]
    pub low: usize,
}

/// Aggregate portfolio metrics
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_properties: usize,
    pub average_composite_score: f64,
    pub risk_distribution: RiskDistribution,
    /// Top 5 locations by composite score, descending
    pub highest_risk_properties: Vec<PropertyRisk>,
}

/// Summarize per-location results into portfolio metrics.
///
/// Pure so the aggregation math is testable without any provider in the
/// loop. `properties` must be non-empty (the HTTP layer rejects empty
/// portfolios before this point).
pub fn summarize_portfolio(properties: &[PropertyRisk]) -> PortfolioSummary {
    let total = properties.len();
    let mean = properties.iter().map(|p| p.composite_score).sum::<f64>() / total as f64;

    let mut distribution = RiskDistribution::default();
    for p in properties {
        match p.risk_level {
            RiskLevel::Extreme => distribution.extreme += 1,
            RiskLevel::High => distribution.high += 1,
            RiskLevel::Moderate => distribution.moderate += 1,
            RiskLevel::Low => distribution.low += 1,
        }
    }

    let mut ranked = properties.to_vec();
    ranked.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(5);

    PortfolioSummary {
        total_properties: total,
        average_composite_score: (mean * 10.0).round() / 10.0,
        risk_distribution: distribution,
        highest_risk_properties: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prop(score: f64) -> PropertyRisk {
        PropertyRisk {
            latitude: 39.7,
            longitude: -105.0,
            composite_score: score,
            risk_level: RiskLevel::from_score(score),
        }
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let summary = summarize_portfolio(&[prop(10.0), prop(10.0), prop(10.1)]);
        // mean = 10.0333...
        assert_eq!(summary.average_composite_score, 10.0);
        assert_eq!(summary.total_properties, 3);
    }

    #[test]
    fn distribution_counts_sum_to_total() {
        let scores = [5.0, 30.0, 55.0, 80.0, 99.0, 24.9, 25.0];
        let props: Vec<_> = scores.iter().map(|&s| prop(s)).collect();
        let summary = summarize_portfolio(&props);

        let d = summary.risk_distribution;
        assert_eq!(d.extreme + d.high + d.moderate + d.low, scores.len());
        assert_eq!(d.extreme, 2);
        assert_eq!(d.high, 1);
        assert_eq!(d.moderate, 2);
        assert_eq!(d.low, 2);
    }

    #[test]
    fn highest_risk_is_top_five_descending() {
        let scores = [10.0, 90.0, 40.0, 70.0, 20.0, 60.0, 50.0];
        let props: Vec<_> = scores.iter().map(|&s| prop(s)).collect();
        let summary = summarize_portfolio(&props);

        let top: Vec<f64> = summary
            .highest_risk_properties
            .iter()
            .map(|p| p.composite_score)
            .collect();
        assert_eq!(top, vec![90.0, 70.0, 60.0, 50.0, 40.0]);
    }

    #[test]
    fn small_portfolio_ranks_all_entries() {
        let summary = summarize_portfolio(&[prop(30.0), prop(10.0)]);
        assert_eq!(summary.highest_risk_properties.len(), 2);
        assert!(
            summary.highest_risk_properties[0].composite_score
                >= summary.highest_risk_properties[1].composite_score
        );
    }

    proptest! {
        #[test]
        fn summary_invariants_hold(scores in proptest::collection::vec(0.0f64..=100.0, 1..40)) {
            let props: Vec<_> = scores.iter().map(|&s| prop(s)).collect();
            let summary = summarize_portfolio(&props);

            let d = summary.risk_distribution;
            prop_assert_eq!(d.extreme + d.high + d.moderate + d.low, scores.len());
            prop_assert_eq!(summary.total_properties, scores.len());
            prop_assert_eq!(
                summary.highest_risk_properties.len(),
                scores.len().min(5)
            );
            for pair in summary.highest_risk_properties.windows(2) {
                prop_assert!(pair[0].composite_score >= pair[1].composite_score);
            }
            prop_assert!((0.0..=100.0).contains(&summary.average_composite_score));
        }
    }
}
