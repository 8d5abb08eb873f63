//! USGS FDSN earthquake catalog client
//!
//! Queries `earthquake.usgs.gov/fdsnws/event/1/query` for events near a
//! point, in GeoJSON. Coordinates arrive as `[longitude, latitude, depth]`
//! and event times as epoch milliseconds.

use crate::{http_client, ProviderError, Result};
use chrono::{DateTime, Duration, Utc};
use geo_filter::GeoPoint;
use risk_scoring::SeismicEvent;
use serde::Deserialize;
use tracing::info;

const SERVICE: &str = "usgs";

/// Minimum magnitude for near-location queries
pub const DEFAULT_MIN_MAGNITUDE: f64 = 2.0;

/// Request window for near-location queries, in days
pub const DEFAULT_FETCH_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct UsgsConfig {
    pub base_url: String,
    pub timeout_sec: u64,
    /// Maximum records per query
    pub limit: u32,
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://earthquake.usgs.gov/fdsnws/event/1/query".to_string(),
            timeout_sec: 30,
            limit: 1000,
        }
    }
}

pub struct UsgsClient {
    config: UsgsConfig,
    client: reqwest::Client,
}

impl Default for UsgsClient {
    fn default() -> Self {
        Self::new(UsgsConfig::default())
    }
}

impl UsgsClient {
    pub fn new(config: UsgsConfig) -> Self {
        let client = http_client(config.timeout_sec);
        Self { config, client }
    }

    /// Fetch earthquakes within `radius_km` of `center` over the last
    /// `window_days`, at or above `min_magnitude`.
    pub async fn earthquakes(
        &self,
        center: GeoPoint,
        radius_km: f64,
        window_days: i64,
        min_magnitude: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeismicEvent>> {
        let start = (now - Duration::days(window_days)).format("%Y-%m-%d");
        let end = now.format("%Y-%m-%d");

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("format", "geojson".to_string()),
                ("starttime", start.to_string()),
                ("endtime", end.to_string()),
                ("minmagnitude", min_magnitude.to_string()),
                ("latitude", center.latitude.to_string()),
                ("longitude", center.longitude.to_string()),
                ("maxradiuskm", radius_km.to_string()),
                ("limit", self.config.limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let events = parse_fdsn_geojson(&body)?;
        info!("retrieved {} earthquake records", events.len());
        Ok(events)
    }

    /// Near-location fetch with the catalog defaults (365-day window,
    /// magnitude >= 2.0)
    pub async fn earthquakes_near(
        &self,
        center: GeoPoint,
        radius_km: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeismicEvent>> {
        self.earthquakes(
            center,
            radius_km,
            DEFAULT_FETCH_WINDOW_DAYS,
            DEFAULT_MIN_MAGNITUDE,
            now,
        )
        .await
    }
}

#[derive(Deserialize)]
struct FdsnResponse {
    #[serde(default)]
    features: Vec<FdsnFeature>,
}

#[derive(Deserialize)]
struct FdsnFeature {
    id: String,
    properties: FdsnProperties,
    geometry: FdsnGeometry,
}

#[derive(Deserialize)]
struct FdsnProperties {
    time: i64,
    mag: Option<f64>,
    place: Option<String>,
}

#[derive(Deserialize)]
struct FdsnGeometry {
    /// [longitude, latitude, depth_km]
    coordinates: Vec<f64>,
}

fn parse_fdsn_geojson(body: &str) -> Result<Vec<SeismicEvent>> {
    let response: FdsnResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;

    response
        .features
        .into_iter()
        .map(|feature| {
            let coords = &feature.geometry.coordinates;
            if coords.len() < 3 {
                return Err(ProviderError::MissingField {
                    service: SERVICE,
                    field: "coordinates",
                });
            }
            let magnitude = feature.properties.mag.ok_or(ProviderError::MissingField {
                service: SERVICE,
                field: "mag",
            })?;
            let time = DateTime::from_timestamp_millis(feature.properties.time).ok_or(
                ProviderError::Parse {
                    service: SERVICE,
                    detail: format!("invalid event time {}", feature.properties.time),
                },
            )?;

            Ok(SeismicEvent {
                id: feature.id,
                time,
                latitude: coords[1],
                longitude: coords[0],
                depth_km: coords[2],
                magnitude,
                place: feature.properties.place,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "us7000abcd",
                "properties": {
                    "mag": 4.2,
                    "place": "10 km NE of Golden, Colorado",
                    "time": 1717243200000
                },
                "geometry": {
                    "type": "Point",
                    "coordinates": [-105.18, 39.79, 8.4]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_fdsn_feature() {
        let events = parse_fdsn_geojson(SAMPLE).unwrap();
        assert_eq!(events.len(), 1);

        let e = &events[0];
        assert_eq!(e.id, "us7000abcd");
        assert_eq!(e.magnitude, 4.2);
        assert_eq!(e.latitude, 39.79);
        assert_eq!(e.longitude, -105.18);
        assert_eq!(e.depth_km, 8.4);
        assert_eq!(e.place.as_deref(), Some("10 km NE of Golden, Colorado"));
        assert_eq!(e.time.timestamp_millis(), 1717243200000);
    }

    #[test]
    fn empty_feature_list_is_valid() {
        let events = parse_fdsn_geojson(r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_surfaces_request_error() {
        // Nothing listens on the discard port; the connect failure must
        // come back as a Request error, not a panic or an empty result
        let client = UsgsClient::new(UsgsConfig {
            base_url: "http://127.0.0.1:9/fdsnws/event/1/query".to_string(),
            timeout_sec: 1,
            limit: 10,
        });
        let err = client
            .earthquakes_near(GeoPoint::new(39.7392, -104.9903), 500.0, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }

    #[test]
    fn missing_magnitude_is_an_error() {
        let body = r#"{
            "features": [{
                "id": "x",
                "properties": {"mag": null, "time": 0},
                "geometry": {"coordinates": [-105.0, 39.0, 1.0]}
            }]
        }"#;
        let err = parse_fdsn_geojson(body).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::MissingField { field: "mag", .. }
        ));
    }
}
