//! NASA FIRMS active-fire detection client
//!
//! Fetches satellite fire detections from the FIRMS area API, which serves
//! CSV keyed by API key, detection source, bounding box, and day count
//! (1-10). Without `NASA_FIRMS_API_KEY` set, the DEMO_KEY is used and
//! coverage is limited to the US.

use crate::{http_client, ProviderError, Result};
use chrono::NaiveDateTime;
use geo_filter::GeoPoint;
use risk_scoring::FireDetection;
use serde::Deserialize;
use tracing::{info, warn};

const SERVICE: &str = "firms";

/// Default detection source (375 m resolution, near-real-time)
pub const DEFAULT_SOURCE: &str = "VIIRS_NOAA20_NRT";

/// The area API serves at most this many days of detections
pub const MAX_DAYS: u32 = 10;

/// Rough km per degree of latitude, used for radius -> bounding box
const KM_PER_DEGREE: f64 = 111.0;

/// Geographic bounding box (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Square box around a center point covering `radius_km` in each
    /// direction
    pub fn from_center(center: GeoPoint, radius_km: f64) -> Self {
        let deg = radius_km / KM_PER_DEGREE;
        Self {
            west: center.longitude - deg,
            south: center.latitude - deg,
            east: center.longitude + deg,
            north: center.latitude + deg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FirmsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_sec: u64,
}

impl Default for FirmsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firms.modaps.eosdis.nasa.gov/api/area/csv".to_string(),
            api_key: "DEMO_KEY".to_string(),
            timeout_sec: 30,
        }
    }
}

impl FirmsConfig {
    /// Read the API key from `NASA_FIRMS_API_KEY`, falling back to
    /// DEMO_KEY
    pub fn from_env() -> Self {
        let api_key = std::env::var("NASA_FIRMS_API_KEY").unwrap_or_else(|_| {
            warn!("NASA_FIRMS_API_KEY not set; DEMO_KEY limits coverage to the US");
            "DEMO_KEY".to_string()
        });
        Self {
            api_key,
            ..Self::default()
        }
    }
}

pub struct FirmsClient {
    config: FirmsConfig,
    client: reqwest::Client,
}

impl Default for FirmsClient {
    fn default() -> Self {
        Self::new(FirmsConfig::from_env())
    }
}

impl FirmsClient {
    pub fn new(config: FirmsConfig) -> Self {
        let client = http_client(config.timeout_sec);
        Self { config, client }
    }

    /// Fetch active-fire detections inside `area` over the last `days`
    /// days (clamped to 1-10).
    pub async fn fires(
        &self,
        area: BoundingBox,
        source: &str,
        days: u32,
    ) -> Result<Vec<FireDetection>> {
        let days = days.clamp(1, MAX_DAYS);
        let url = format!(
            "{}/{}/{}/{:.4},{:.4},{:.4},{:.4}/{}",
            self.config.base_url,
            self.config.api_key,
            source,
            area.west,
            area.south,
            area.east,
            area.north,
            days
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;

        // The area API reports errors (bad key, rate limit) as short plain
        // text bodies with a 200 status
        if body.len() < 50 || body.to_lowercase().contains("error") {
            let preview = body.get(..100).unwrap_or(&body);
            warn!("FIRMS returned no usable data: {}", preview.trim_end());
            return Ok(Vec::new());
        }

        let fires = parse_firms_csv(&body)?;
        info!("retrieved {} active fire detections", fires.len());
        Ok(fires)
    }

    /// Fetch detections near a center point, converting the radius to a
    /// bounding box
    pub async fn fires_near(
        &self,
        center: GeoPoint,
        radius_km: f64,
        days: u32,
    ) -> Result<Vec<FireDetection>> {
        self.fires(BoundingBox::from_center(center, radius_km), DEFAULT_SOURCE, days)
            .await
    }
}

#[derive(Deserialize)]
struct FirmsRow {
    latitude: f64,
    longitude: f64,
    acq_date: String,
    acq_time: String,
    #[serde(default)]
    frp: Option<f64>,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    bright_ti4: Option<f64>,
}

fn parse_firms_csv(body: &str) -> Result<Vec<FireDetection>> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut fires = Vec::new();

    for row in reader.deserialize::<FirmsRow>() {
        let row = row.map_err(|e| ProviderError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;

        // acq_time is HHMM with leading zeros stripped ("48" = 00:48)
        let stamp = format!("{} {:0>4}", row.acq_date, row.acq_time);
        let acquired_at = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H%M")
            .map_err(|e| ProviderError::Parse {
                service: SERVICE,
                detail: format!("bad acquisition time {stamp:?}: {e}"),
            })?
            .and_utc();

        fires.push(FireDetection {
            acquired_at,
            latitude: row.latitude,
            longitude: row.longitude,
            frp_mw: row.frp.unwrap_or(0.0),
            confidence: row.confidence.unwrap_or_default(),
            brightness_kelvin: row.bright_ti4,
        });
    }

    Ok(fires)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE: &str = "\
latitude,longitude,bright_ti4,scan,track,acq_date,acq_time,satellite,confidence,version,bright_ti5,frp,daynight
39.8821,-105.2344,338.5,0.39,0.36,2024-06-01,948,N20,n,2.0NRT,297.1,12.6,D
39.9012,-105.1998,351.2,0.39,0.36,2024-06-01,2130,N20,h,2.0NRT,301.4,87.3,N
";

    #[test]
    fn parses_firms_rows() {
        let fires = parse_firms_csv(SAMPLE).unwrap();
        assert_eq!(fires.len(), 2);

        let f = &fires[0];
        assert_eq!(f.latitude, 39.8821);
        assert_eq!(f.frp_mw, 12.6);
        assert_eq!(f.confidence, "n");
        assert_eq!(f.brightness_kelvin, Some(338.5));
        // "948" zero-pads to 09:48
        assert_eq!(f.acquired_at.hour(), 9);
        assert_eq!(f.acquired_at.minute(), 48);
        assert_eq!(f.acquired_at.day(), 1);

        assert_eq!(fires[1].acquired_at.hour(), 21);
    }

    #[test]
    fn header_only_body_yields_empty() {
        let header = "latitude,longitude,bright_ti4,scan,track,acq_date,acq_time,satellite,confidence,version,bright_ti5,frp,daynight\n";
        assert!(parse_firms_csv(header).unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_surfaces_request_error() {
        let client = FirmsClient::new(FirmsConfig {
            base_url: "http://127.0.0.1:9/api/area/csv".to_string(),
            api_key: "DEMO_KEY".to_string(),
            timeout_sec: 1,
        });
        let center = GeoPoint::new(39.7392, -104.9903);
        let err = client.fires_near(center, 100.0, 7).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }

    #[test]
    fn bounding_box_from_center() {
        let center = GeoPoint::new(39.7392, -104.9903);
        let bbox = BoundingBox::from_center(center, 222.0);
        assert!((bbox.north - (39.7392 + 2.0)).abs() < 1e-9);
        assert!((bbox.south - (39.7392 - 2.0)).abs() < 1e-9);
        assert!((bbox.west - (-104.9903 - 2.0)).abs() < 1e-9);
        assert!((bbox.east - (-104.9903 + 2.0)).abs() < 1e-9);
    }
}
