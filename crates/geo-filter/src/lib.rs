//! Geospatial filtering for hazard records
//!
//! Computes great-circle distances with the haversine formula and filters
//! record collections down to those within a search radius and a lookback
//! window. This is the leaf crate of the risk pipeline: everything here is
//! pure, synchronous, and deterministic given its inputs (the lookback
//! cutoff `now` is an explicit argument, not a clock read).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distance in km from this point to another
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Haversine distance between two points in km.
///
/// Deltas are taken after the radian conversion so the scalar and batch
/// forms agree bit-for-bit, keeping the inclusive radius boundary stable.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2.to_radians() - lon1.to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Haversine distance from one center to many candidate points.
///
/// The center trigonometry is hoisted out of the loop so scoring a large
/// record set (or a portfolio of locations) stays cheap. `lats` and `lons`
/// must have the same length.
pub fn haversine_km_batch(center: GeoPoint, lats: &[f64], lons: &[f64]) -> Vec<f64> {
    debug_assert_eq!(lats.len(), lons.len());

    let lat0 = center.latitude.to_radians();
    let lon0 = center.longitude.to_radians();
    let cos_lat0 = lat0.cos();

    lats.iter()
        .zip(lons.iter())
        .map(|(&lat, &lon)| {
            let lat_rad = lat.to_radians();
            let dlat = lat_rad - lat0;
            let dlon = lon.to_radians() - lon0;
            let a = (dlat / 2.0).sin().powi(2)
                + cos_lat0 * lat_rad.cos() * (dlon / 2.0).sin().powi(2);
            2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
        })
        .collect()
}

/// A record that carries its own coordinates and observation timestamp
pub trait GeoTagged {
    /// (latitude, longitude) in degrees
    fn coordinates(&self) -> (f64, f64);
    /// Timestamp used for recency filtering
    fn observed_at(&self) -> DateTime<Utc>;
}

/// A record that survived filtering, annotated with its distance from the
/// query center
#[derive(Debug, Clone, Serialize)]
pub struct Within<R> {
    pub record: R,
    pub distance_km: f64,
}

/// Filter records to those within `radius_km` of `center` and not older
/// than `now - lookback`.
///
/// Recency is applied first (inclusive: `observed_at >= cutoff`), then
/// distance (inclusive: `distance <= radius_km`). An empty result is a
/// normal outcome, not an error; output ordering is unspecified.
pub fn filter_within<R: GeoTagged>(
    records: Vec<R>,
    center: GeoPoint,
    radius_km: f64,
    lookback: Duration,
    now: DateTime<Utc>,
) -> Vec<Within<R>> {
    let cutoff = now - lookback;
    let recent: Vec<R> = records
        .into_iter()
        .filter(|r| r.observed_at() >= cutoff)
        .collect();

    if recent.is_empty() {
        return Vec::new();
    }

    let (lats, lons): (Vec<f64>, Vec<f64>) = recent.iter().map(|r| r.coordinates()).unzip();
    let distances = haversine_km_batch(center, &lats, &lons);

    recent
        .into_iter()
        .zip(distances)
        .filter(|(_, d)| *d <= radius_km)
        .map(|(record, distance_km)| Within {
            record,
            distance_km,
        })
        .collect()
}
