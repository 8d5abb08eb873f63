//! NWS active weather alert client
//!
//! Queries `api.weather.gov/alerts/active` by point or by two-letter state
//! code. The NWS API requires a User-Agent header identifying the caller.
//! Alerts come back pre-scoped to the query area; the scorer applies no
//! further distance filtering to them.

use crate::{ProviderError, Result};
use geo_filter::GeoPoint;
use risk_scoring::{AlertSeverity, WeatherAlert};
use serde::Deserialize;
use tracing::info;

const SERVICE: &str = "nws";

#[derive(Debug, Clone)]
pub struct NwsConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_sec: u64,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weather.gov".to_string(),
            user_agent: "(hazard-risk-platform, ops@hazardrisk.example)".to_string(),
            timeout_sec: 30,
        }
    }
}

/// Alert query scope: a point or a US state
#[derive(Debug, Clone)]
pub enum AlertArea {
    Point(GeoPoint),
    State(String),
}

pub struct NwsClient {
    config: NwsConfig,
    client: reqwest::Client,
}

impl Default for NwsClient {
    fn default() -> Self {
        Self::new(NwsConfig::default())
    }
}

impl NwsClient {
    pub fn new(config: NwsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_sec))
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to build HTTP client");
        Self { config, client }
    }

    /// Fetch all active alerts covering the given area
    pub async fn active_alerts(&self, area: &AlertArea) -> Result<Vec<WeatherAlert>> {
        let url = format!("{}/alerts/active", self.config.base_url);
        let query = match area {
            AlertArea::Point(p) => ("point", format!("{},{}", p.latitude, p.longitude)),
            AlertArea::State(code) => ("area", code.clone()),
        };

        let response = self.client.get(&url).query(&[query]).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                service: SERVICE,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let alerts = parse_alerts_geojson(&body)?;
        info!("retrieved {} active alerts", alerts.len());
        Ok(alerts)
    }
}

#[derive(Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    features: Vec<AlertFeature>,
}

#[derive(Deserialize)]
struct AlertFeature {
    properties: AlertProperties,
}

#[derive(Deserialize)]
struct AlertProperties {
    event: Option<String>,
    severity: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    onset: Option<chrono::DateTime<chrono::Utc>>,
    expires: Option<chrono::DateTime<chrono::Utc>>,
}

fn parse_alerts_geojson(body: &str) -> Result<Vec<WeatherAlert>> {
    let response: AlertsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse {
            service: SERVICE,
            detail: e.to_string(),
        })?;

    Ok(response
        .features
        .into_iter()
        .map(|f| {
            let p = f.properties;
            let severity = p
                .severity
                .as_deref()
                .map(AlertSeverity::from_label)
                .unwrap_or(AlertSeverity::Unknown);
            WeatherAlert {
                event: p.event.unwrap_or_default(),
                severity,
                headline: p.headline,
                description: p.description,
                onset: p.onset,
                expires: p.expires,
            }
        })
        .collect())
}
