//! API route handlers
//!
//! Input validation happens here, before anything reaches the scoring core;
//! the core assumes ranges are already checked. Validation failures are
//! 400s, internal faults are 500s, and a portfolio request fails as a whole
//! rather than returning a partial risk distribution.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use geo_filter::GeoPoint;
use hazard_providers::{firms, AlertArea, BoundingBox};
use risk_scoring::{SeismicEvent, WeatherAlert, DEFAULT_RADIUS_KM};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assess::{
    assess_location as run_assessment, assess_portfolio as run_portfolio, summarize_portfolio,
    Assessment, PortfolioSummary, PropertyRisk,
};
use crate::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

/// A location to assess
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LocationInput {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

impl LocationInput {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ApiError::Validation(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ApiError::Validation(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        if self.radius_km <= 0.0 {
            return Err(ApiError::Validation(format!(
                "radius_km must be positive, got {}",
                self.radius_km
            )));
        }
        Ok(())
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Serialize)]
pub struct RiskResponse {
    pub location: LocationInput,
    #[serde(flatten)]
    pub assessment: Assessment,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct PortfolioInput {
    pub properties: Vec<LocationInput>,
}

#[derive(Serialize)]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub summary: PortfolioSummary,
    pub timestamp: DateTime<Utc>,
}

/// API root: service description and endpoint index
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Natural Disaster Risk Intelligence API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "risk_assessment": "/api/v1/risk/location",
            "portfolio_analysis": "/api/v1/risk/portfolio",
            "earthquakes": "/api/v1/data/earthquakes",
            "wildfires": "/api/v1/data/wildfires",
            "weather_alerts": "/api/v1/data/weather-alerts"
        }
    }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "risk-gateway",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Assess natural-disaster risk for one location
pub async fn assess_location(
    State(state): State<AppState>,
    Json(input): Json<LocationInput>,
) -> Result<Json<RiskResponse>, ApiError> {
    input.validate()?;

    let now = Utc::now();
    let assessment = run_assessment(&state, input.center(), input.radius_km, now).await;

    Ok(Json(RiskResponse {
        location: input,
        assessment,
        timestamp: now,
    }))
}

/// Assess risk across a portfolio of locations
pub async fn assess_portfolio(
    State(state): State<AppState>,
    Json(input): Json<PortfolioInput>,
) -> Result<Json<PortfolioResponse>, ApiError> {
    if input.properties.is_empty() {
        return Err(ApiError::Validation("no properties provided".to_string()));
    }
    for property in &input.properties {
        property.validate()?;
    }

    let now = Utc::now();
    let locations: Vec<(GeoPoint, f64)> = input
        .properties
        .iter()
        .map(|p| (p.center(), p.radius_km))
        .collect();

    let assessed = run_portfolio(&state, &locations, now).await;

    let properties: Vec<PropertyRisk> = input
        .properties
        .iter()
        .zip(&assessed)
        .map(|(loc, a)| PropertyRisk {
            latitude: loc.latitude,
            longitude: loc.longitude,
            composite_score: a.result.composite_score,
            risk_level: a.result.risk_level,
        })
        .collect();

    Ok(Json(PortfolioResponse {
        summary: summarize_portfolio(&properties),
        timestamp: now,
    }))
}

// ---- Raw data passthrough endpoints ----

fn default_min_magnitude() -> f64 {
    2.5
}
fn default_quake_days() -> i64 {
    30
}

#[derive(Deserialize)]
pub struct EarthquakeQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: f64,
    #[serde(default = "default_quake_days")]
    pub days: i64,
}

#[derive(Serialize)]
pub struct EarthquakeData {
    pub count: usize,
    pub earthquakes: Vec<SeismicEvent>,
}

pub async fn get_earthquakes(
    State(state): State<AppState>,
    Query(query): Query<EarthquakeQuery>,
) -> Result<Json<EarthquakeData>, ApiError> {
    let location = LocationInput {
        latitude: query.latitude,
        longitude: query.longitude,
        radius_km: query.radius_km,
    };
    location.validate()?;
    if !(1..=365).contains(&query.days) {
        return Err(ApiError::Validation(format!(
            "days must be 1-365, got {}",
            query.days
        )));
    }

    let earthquakes = state
        .usgs
        .earthquakes(
            location.center(),
            query.radius_km,
            query.days,
            query.min_magnitude,
            Utc::now(),
        )
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(EarthquakeData {
        count: earthquakes.len(),
        earthquakes,
    }))
}

fn default_radius_deg() -> f64 {
    2.0
}
fn default_fire_days() -> u32 {
    7
}

#[derive(Deserialize)]
pub struct WildfireQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Half-width of the search box in degrees (~111 km per degree)
    #[serde(default = "default_radius_deg")]
    pub radius_deg: f64,
    #[serde(default = "default_fire_days")]
    pub days: u32,
}

#[derive(Serialize)]
pub struct WildfireData {
    pub count: usize,
    pub fires: Vec<risk_scoring::FireDetection>,
}

pub async fn get_wildfires(
    State(state): State<AppState>,
    Query(query): Query<WildfireQuery>,
) -> Result<Json<WildfireData>, ApiError> {
    let location = LocationInput {
        latitude: query.latitude,
        longitude: query.longitude,
        radius_km: DEFAULT_RADIUS_KM,
    };
    location.validate()?;
    if query.radius_deg <= 0.0 {
        return Err(ApiError::Validation(format!(
            "radius_deg must be positive, got {}",
            query.radius_deg
        )));
    }
    if !(1..=firms::MAX_DAYS).contains(&query.days) {
        return Err(ApiError::Validation(format!(
            "days must be 1-{}, got {}",
            firms::MAX_DAYS,
            query.days
        )));
    }

    let area = BoundingBox {
        west: query.longitude - query.radius_deg,
        south: query.latitude - query.radius_deg,
        east: query.longitude + query.radius_deg,
        north: query.latitude + query.radius_deg,
    };
    let fires = state
        .firms
        .fires(area, firms::DEFAULT_SOURCE, query.days)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(WildfireData {
        count: fires.len(),
        fires,
    }))
}

#[derive(Deserialize)]
pub struct AlertQuery {
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize)]
pub struct AlertData {
    pub count: usize,
    pub alerts: Vec<WeatherAlert>,
}

fn alert_area(query: &AlertQuery) -> Result<AlertArea, ApiError> {
    if let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) {
        let location = LocationInput {
            latitude,
            longitude,
            radius_km: DEFAULT_RADIUS_KM,
        };
        location.validate()?;
        return Ok(AlertArea::Point(location.center()));
    }
    if let Some(code) = &query.state {
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ApiError::Validation(format!(
                "state must be a two-letter code, got {code:?}"
            )));
        }
        return Ok(AlertArea::State(code.clone()));
    }
    Err(ApiError::Validation(
        "must provide either state or lat/lon".to_string(),
    ))
}

pub async fn get_weather_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertData>, ApiError> {
    let area = alert_area(&query)?;
    let alerts = state
        .nws
        .active_alerts(&area)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(AlertData {
        count: alerts.len(),
        alerts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(latitude: f64, longitude: f64, radius_km: f64) -> LocationInput {
        LocationInput {
            latitude,
            longitude,
            radius_km,
        }
    }

    #[test]
    fn valid_location_passes() {
        assert!(loc(39.7392, -104.9903, 500.0).validate().is_ok());
        assert!(loc(-90.0, 180.0, 1.0).validate().is_ok());
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(loc(90.1, 0.0, 500.0).validate().is_err());
        assert!(loc(0.0, -180.5, 500.0).validate().is_err());
    }

    #[test]
    fn non_positive_radius_rejected() {
        assert!(loc(0.0, 0.0, 0.0).validate().is_err());
        assert!(loc(0.0, 0.0, -10.0).validate().is_err());
    }

    #[test]
    fn radius_defaults_to_500() {
        let input: LocationInput =
            serde_json::from_str(r#"{"latitude": 39.7, "longitude": -105.0}"#).unwrap();
        assert_eq!(input.radius_km, 500.0);
    }

    #[test]
    fn alert_area_prefers_point_over_state() {
        let query = AlertQuery {
            state: Some("CO".to_string()),
            latitude: Some(39.7),
            longitude: Some(-105.0),
        };
        assert!(matches!(alert_area(&query).unwrap(), AlertArea::Point(_)));
    }

    #[test]
    fn alert_area_rejects_bad_state_code() {
        let query = AlertQuery {
            state: Some("Colorado".to_string()),
            latitude: None,
            longitude: None,
        };
        assert!(alert_area(&query).is_err());

        let query = AlertQuery {
            state: Some("co".to_string()),
            latitude: None,
            longitude: None,
        };
        assert!(alert_area(&query).is_err());
    }

    #[test]
    fn alert_area_requires_some_scope() {
        let query = AlertQuery {
            state: None,
            latitude: None,
            longitude: None,
        };
        assert!(alert_area(&query).is_err());
    }
}
