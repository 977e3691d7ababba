//! The nearest-pharmacy endpoint: validate the form, fetch every pharmacy
//! stocking a matching medication, rank by great-circle distance.

use axum::{extract::State, Extension, Form, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pharmafind_core::resolver::{rank_pharmacies, NearestQuery, RankedPharmacy, ResolveError};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw form fields. Everything is optional here so absence is reported by
/// the resolver's own validation rather than by the extractor.
#[derive(Debug, Deserialize)]
pub(super) struct NearestForm {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub medication: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct NearestPharmacyItem {
    pub id: i64,
    pub public_id: Uuid,
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub matched_medication: String,
    /// Great-circle distance from the user in kilometers.
    pub distance: f64,
}

impl From<RankedPharmacy> for NearestPharmacyItem {
    fn from(ranked: RankedPharmacy) -> Self {
        let pharmacy = ranked.pharmacy;
        Self {
            id: pharmacy.id,
            public_id: pharmacy.public_id,
            latin_name: pharmacy.latin_name,
            arabic_name: pharmacy.arabic_name,
            email: pharmacy.email,
            phone: pharmacy.phone,
            address: pharmacy.address,
            latitude: pharmacy.latitude,
            longitude: pharmacy.longitude,
            matched_medication: pharmacy.matched_medication,
            distance: ranked.distance_km,
        }
    }
}

pub(super) async fn find_nearest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Form(form): Form<NearestForm>,
) -> Result<Json<ApiResponse<Vec<NearestPharmacyItem>>>, ApiError> {
    let query = NearestQuery::parse(
        form.lat.as_deref(),
        form.lng.as_deref(),
        form.medication.as_deref(),
    )
    .map_err(|e| resolve_error(&req_id.0, &e))?;

    let rows = pharmafind_db::find_pharmacies_carrying(&state.pool, &query.medication)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &pharmafind_db::DbError::from(e)))?;

    let matches = rows.into_iter().map(Into::into).collect();
    let ranked =
        rank_pharmacies(query.user, matches).map_err(|e| resolve_error(&req_id.0, &e))?;

    let data = ranked.into_iter().map(NearestPharmacyItem::from).collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn resolve_error(request_id: &str, error: &ResolveError) -> ApiError {
    match error {
        ResolveError::MissingParameter(_) | ResolveError::InvalidCoordinate { .. } => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        ResolveError::NoPharmaciesFound => {
            ApiError::new(request_id, "no_pharmacies_found", error.to_string())
        }
    }
}
