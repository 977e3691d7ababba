use axum::{extract::State, Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// A directory row: pharmacy identity, contact details and map coordinate.
#[derive(Debug, Serialize)]
pub(super) struct PharmacyItem {
    pub id: i64,
    pub public_id: Uuid,
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<PharmacyItem>>>, ApiError> {
    let rows = pharmafind_db::list_pharmacies(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &pharmafind_db::DbError::from(e)))?;

    let data = rows
        .into_iter()
        .map(|row| PharmacyItem {
            id: row.id,
            public_id: row.public_id,
            latin_name: row.latin_name,
            arabic_name: row.arabic_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pharmacy_item_is_serializable() {
        let item = PharmacyItem {
            id: 3,
            public_id: Uuid::nil(),
            latin_name: "Pharmacie Ibn Sina".to_string(),
            arabic_name: "صيدلية ابن سينا".to_string(),
            email: "ibnsina@example.dz".to_string(),
            phone: "021778899".to_string(),
            address: "5 Boulevard Zighout Youcef, Alger".to_string(),
            latitude: 36.775,
            longitude: 3.058,
        };
        let json = serde_json::to_string(&item).expect("serialize PharmacyItem");
        assert!(json.contains("\"latin_name\":\"Pharmacie Ibn Sina\""));
        assert!(json.contains("\"latitude\":36.775"));
    }
}
