//! Pure half of the nearest-pharmacy resolver: request validation and
//! distance ranking.
//!
//! Retrieval is the storage layer's job (`pharmafind_db::find_pharmacies_carrying`);
//! the HTTP handler wires the two together. Keeping validation and ranking
//! here means the interesting invariants are testable without a database.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::geo::{haversine_distance, Coordinate, CoordinateError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A required form field was absent or empty. Detected before any
    /// storage access.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),
    /// A coordinate field was present but not a finite in-range number.
    #[error("parameter '{field}' is not a valid coordinate: '{value}'")]
    InvalidCoordinate {
        field: &'static str,
        value: String,
    },
    /// Valid request, zero pharmacies stock a matching medication. A
    /// business outcome, distinct from storage failure and from success.
    #[error("no pharmacies found with the specified medication")]
    NoPharmaciesFound,
}

/// A validated nearest-pharmacy request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestQuery {
    pub user: Coordinate,
    pub medication: String,
}

impl NearestQuery {
    /// Validate the three raw form fields of a nearest-pharmacy request.
    ///
    /// Fails fast: missing/empty fields are reported before coordinate
    /// parsing, and nothing here touches storage.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingParameter`] for absent or empty
    /// fields, [`ResolveError::InvalidCoordinate`] for unparseable or
    /// out-of-range coordinates.
    pub fn parse(
        lat: Option<&str>,
        lng: Option<&str>,
        medication: Option<&str>,
    ) -> Result<Self, ResolveError> {
        let lat = require("lat", lat)?;
        let lng = require("lng", lng)?;
        let medication = require("medication", medication)?;

        let latitude = parse_coordinate("lat", lat)?;
        let longitude = parse_coordinate("lng", lng)?;
        let user = match Coordinate::new(latitude, longitude) {
            Ok(user) => user,
            Err(CoordinateError::LatitudeOutOfRange(_)) => {
                return Err(ResolveError::InvalidCoordinate {
                    field: "lat",
                    value: lat.to_string(),
                })
            }
            Err(CoordinateError::LongitudeOutOfRange(_)) => {
                return Err(ResolveError::InvalidCoordinate {
                    field: "lng",
                    value: lng.to_string(),
                })
            }
        };

        Ok(Self {
            user,
            medication: medication.to_string(),
        })
    }
}

fn require<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ResolveError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ResolveError::MissingParameter(field)),
    }
}

fn parse_coordinate(field: &'static str, raw: &str) -> Result<f64, ResolveError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolveError::InvalidCoordinate {
            field,
            value: raw.to_string(),
        })
}

/// A pharmacy that stocks a medication matching the search term, as returned
/// by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PharmacyMatch {
    pub id: i64,
    pub public_id: Uuid,
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Latin name of the medication that matched the search term.
    pub matched_medication: String,
}

/// A [`PharmacyMatch`] with its computed distance to the user. Transient and
/// request-scoped; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPharmacy {
    #[serde(flatten)]
    pub pharmacy: PharmacyMatch,
    /// Great-circle distance in kilometers. Serialized as `distance`.
    #[serde(rename = "distance")]
    pub distance_km: f64,
}

/// Attach a distance to every match and sort ascending.
///
/// The sort is stable, so equidistant pharmacies keep their retrieval order.
///
/// # Errors
///
/// Returns [`ResolveError::NoPharmaciesFound`] when `matches` is empty, so
/// callers cannot confuse the business-empty outcome with a success.
pub fn rank_pharmacies(
    user: Coordinate,
    matches: Vec<PharmacyMatch>,
) -> Result<Vec<RankedPharmacy>, ResolveError> {
    if matches.is_empty() {
        return Err(ResolveError::NoPharmaciesFound);
    }

    let mut ranked: Vec<RankedPharmacy> = matches
        .into_iter()
        .map(|pharmacy| {
            let location = Coordinate {
                latitude: pharmacy.latitude,
                longitude: pharmacy.longitude,
            };
            RankedPharmacy {
                distance_km: haversine_distance(user, location),
                pharmacy,
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(ranked)
}
