//! Geodesic distance between a user and a pharmacy.
//!
//! Distances use the haversine formula for the great-circle distance between
//! two points on a sphere given their latitudes and longitudes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid degree ranges.
    ///
    /// Non-finite values (NaN, infinities) fail the range check and are
    /// rejected as well.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Great-circle distance between two coordinates in kilometers.
///
/// Pure and deterministic; identical points yield exactly 0 and antipodal
/// points approach half Earth's circumference (~20015 km).
#[must_use]
pub fn haversine_distance(from: Coordinate, to: Coordinate) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
