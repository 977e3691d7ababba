use axum::{
    extract::{Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct MedicationItem {
    pub id: i64,
    pub latin_name: String,
    pub arabic_name: String,
    pub kind: String,
    pub price: Decimal,
    pub size: Option<String>,
    pub dosage: Option<String>,
    pub prescription: bool,
    pub pharmacy_id: i64,
    pub pharmacy_latin_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct MedicationQueryParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

pub(super) async fn list_medications(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<MedicationQueryParams>,
) -> Result<Json<ApiResponse<Vec<MedicationItem>>>, ApiError> {
    let term = params.q.as_deref().filter(|q| !q.is_empty());
    let rows =
        pharmafind_db::search_medications(&state.pool, term, normalize_limit(params.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &pharmafind_db::DbError::from(e)))?;

    let data = rows
        .into_iter()
        .map(|row| MedicationItem {
            id: row.id,
            latin_name: row.latin_name,
            arabic_name: row.arabic_name,
            kind: row.kind,
            price: row.price,
            size: row.size,
            dosage: row.dosage,
            prescription: row.prescription,
            pharmacy_id: row.pharmacy_id,
            pharmacy_latin_name: row.pharmacy_latin_name,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
