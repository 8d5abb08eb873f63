//! Disaster Risk Gateway
//!
//! HTTP API (and one-shot CLI) over the risk-scoring core. The gateway owns
//! all I/O: it fetches the three hazard feeds concurrently, recovers any
//! provider failure to an empty record set, runs the pure scoring pipeline,
//! and serves the result. The scoring core itself never performs I/O.

use std::sync::Arc;

use hazard_providers::{FirmsClient, NwsClient, UsgsClient};
use risk_scoring::RiskScorer;

pub mod assess;
pub mod routes;

/// Shared application state: one immutable scorer and one client per feed.
///
/// Everything here is read-only after startup, so handlers can run fully
/// concurrently with no locking.
#[derive(Clone)]
pub struct AppState {
    pub scorer: Arc<RiskScorer>,
    pub usgs: Arc<UsgsClient>,
    pub firms: Arc<FirmsClient>,
    pub nws: Arc<NwsClient>,
}

impl AppState {
    pub fn new(scorer: RiskScorer) -> Self {
        Self {
            scorer: Arc::new(scorer),
            usgs: Arc::new(UsgsClient::default()),
            firms: Arc::new(FirmsClient::default()),
            nws: Arc::new(NwsClient::default()),
        }
    }
}
