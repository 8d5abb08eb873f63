//! Hazard data feed connectors
//!
//! One client per upstream government service:
//!
//! - [`usgs`] — USGS FDSN earthquake catalog (GeoJSON)
//! - [`firms`] — NASA FIRMS active-fire detections (CSV)
//! - [`noaa`] — NWS active weather alerts (GeoJSON)
//!
//! Each client exposes a typed fetch method returning
//! `Result<Vec<_>, ProviderError>`. Callers that feed the risk scorer are
//! expected to recover failures by substituting an empty record set, which
//! keeps an upstream outage indistinguishable from "no hazards" downstream
//! (a deliberate property of the scoring contract).

use thiserror::Error;

pub mod firms;
pub mod noaa;
pub mod usgs;

pub use firms::{BoundingBox, FirmsClient, FirmsConfig};
pub use noaa::{AlertArea, NwsClient, NwsConfig};
pub use usgs::{UsgsClient, UsgsConfig};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("failed to parse {service} response: {detail}")]
    Parse {
        service: &'static str,
        detail: String,
    },
    #[error("{service} record missing field {field}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Shared HTTP client construction with a per-provider timeout
pub(crate) fn http_client(timeout_sec: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_sec))
        .build()
        .expect("failed to build HTTP client")
}
