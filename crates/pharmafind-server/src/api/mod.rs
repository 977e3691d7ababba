mod medications;
mod nearest;
mod pharmacies;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "no_pharmacies_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &pharmafind_db::DbError) -> ApiError {
    // Raw storage error text stays in the logs; the client gets a fixed string.
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/pharmacies/nearest", post(nearest::find_nearest))
        .route("/api/v1/pharmacies", get(pharmacies::list_pharmacies))
        .route("/api/v1/medications", get(medications::list_medications))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match pharmafind_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_rate_limit() -> RateLimitState {
        RateLimitState::new(1_000, Duration::from_secs(60))
    }

    /// A pool that never connects; good enough for routes that fail before
    /// touching the database.
    fn unreachable_pool() -> PgPool {
        sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(250))
            .connect_lazy("postgres://nobody@127.0.0.1:1/nowhere")
            .expect("lazy pool")
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_no_pharmacies_found_maps_to_not_found() {
        let response =
            ApiError::new("req-1", "no_pharmacies_found", "no pharmacies").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_unknown_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "internal_error", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn exhausted_rate_limit_returns_429_before_any_handler() {
        let app = build_app(
            AppState {
                pool: unreachable_pool(),
            },
            RateLimitState::new(0, Duration::from_secs(60)),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pharmacies")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn validation_failure_reports_before_storage_access() {
        // The pool is unreachable; a 400 (not a 500) proves validation runs
        // before any storage call.
        let app = build_app(
            AppState {
                pool: unreachable_pool(),
            },
            test_rate_limit(),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pharmacies/nearest")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("lng=3.05&medication=Paracetamol"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
        assert!(
            json["error"]["message"]
                .as_str()
                .unwrap_or_default()
                .contains("lat"),
            "message should name the missing field"
        );
    }

    #[tokio::test]
    async fn responses_carry_request_id_header() {
        let app = build_app(
            AppState {
                pool: unreachable_pool(),
            },
            test_rate_limit(),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pharmacies/nearest")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("x-request-id", "req-42")
                    .body(Body::from(""))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
    }

    // -------------------------------------------------------------------------
    // Route integration tests (with DB)
    // -------------------------------------------------------------------------

    /// Insert a pharmacy row for route tests and return its id.
    async fn seed_pharmacy(
        pool: &sqlx::PgPool,
        latin_name: &str,
        email: &str,
        latitude: f64,
        longitude: f64,
    ) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO pharmacies \
                 (latin_name, arabic_name, email, phone, address, latitude, longitude) \
             VALUES ($1, $2, $3, '021000000', 'Rue des Fréres, Alger', $4, $5) \
             RETURNING id",
        )
        .bind(latin_name)
        .bind(format!("صيدلية {latin_name}"))
        .bind(email)
        .bind(latitude)
        .bind(longitude)
        .fetch_one(pool)
        .await
        .expect("seed_pharmacy failed")
    }

    async fn seed_medication(pool: &sqlx::PgPool, pharmacy_id: i64, latin_name: &str) {
        sqlx::query(
            "INSERT INTO medications \
                 (pharmacy_id, latin_name, arabic_name, kind, price) \
             VALUES ($1, $2, $3, 'tablet', 120.00)",
        )
        .bind(pharmacy_id)
        .bind(latin_name)
        .bind(format!("{latin_name} بالعربية"))
        .execute(pool)
        .await
        .expect("seed_medication failed");
    }

    async fn post_nearest(app: Router, body: &'static str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/pharmacies/nearest")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json parse");
        (status, json)
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn nearest_returns_pharmacies_sorted_by_distance(pool: sqlx::PgPool) {
        // Oran seeded first so ascending-by-distance must reorder.
        let oran = seed_pharmacy(&pool, "El Bahia", "bahia@example.dz", 35.70, -0.64).await;
        let hydra = seed_pharmacy(&pool, "El Chifa", "chifa@example.dz", 36.76, 3.06).await;
        seed_medication(&pool, oran, "Paracetamol").await;
        seed_medication(&pool, hydra, "Paracetamol").await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let (status, json) =
            post_nearest(app, "lat=36.77&lng=3.05&medication=Paracetamol").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2, "expected both pharmacies");

        assert_eq!(data[0]["latin_name"].as_str(), Some("El Chifa"));
        let first_distance = data[0]["distance"].as_f64().expect("distance");
        assert!(
            (1.0..2.0).contains(&first_distance),
            "Hydra distance: {first_distance} km"
        );

        assert_eq!(data[1]["latin_name"].as_str(), Some("El Bahia"));
        let second_distance = data[1]["distance"].as_f64().expect("distance");
        assert!(
            (355.0..365.0).contains(&second_distance),
            "Oran distance: {second_distance} km"
        );

        assert_eq!(data[0]["matched_medication"].as_str(), Some("Paracetamol"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn nearest_matches_partial_terms_case_insensitively(pool: sqlx::PgPool) {
        let id = seed_pharmacy(&pool, "El Chifa", "chifa@example.dz", 36.76, 3.06).await;
        seed_medication(&pool, id, "Paracetamol").await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let (status, json) = post_nearest(app, "lat=36.77&lng=3.05&medication=param").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn nearest_ties_keep_retrieval_order(pool: sqlx::PgPool) {
        // Same coordinate, so distances tie exactly; ids decide the order.
        let first = seed_pharmacy(&pool, "Zeta", "zeta@example.dz", 36.76, 3.06).await;
        let second = seed_pharmacy(&pool, "Alpha", "alpha@example.dz", 36.76, 3.06).await;
        seed_medication(&pool, first, "Paracetamol").await;
        seed_medication(&pool, second, "Paracetamol").await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let (status, json) =
            post_nearest(app, "lat=36.77&lng=3.05&medication=Paracetamol").await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data[0]["latin_name"].as_str(), Some("Zeta"));
        assert_eq!(data[1]["latin_name"].as_str(), Some("Alpha"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn nearest_unknown_medication_is_no_pharmacies_found(pool: sqlx::PgPool) {
        let id = seed_pharmacy(&pool, "El Chifa", "chifa@example.dz", 36.76, 3.06).await;
        seed_medication(&pool, id, "Ibuprofen").await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let (status, json) =
            post_nearest(app, "lat=36.77&lng=3.05&medication=Paracetamol").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            json["error"]["code"].as_str(),
            Some("no_pharmacies_found"),
            "empty result must be observably distinct from success"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn nearest_out_of_range_latitude_is_validation_error(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit());
        let (status, json) = post_nearest(app, "lat=95.0&lng=3.05&medication=Paracetamol").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn medications_search_filters_by_term(pool: sqlx::PgPool) {
        let id = seed_pharmacy(&pool, "El Chifa", "chifa@example.dz", 36.76, 3.06).await;
        seed_medication(&pool, id, "Paracetamol").await;
        seed_medication(&pool, id, "Ibuprofen").await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/medications?q=para")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["latin_name"].as_str(), Some("Paracetamol"));
        assert_eq!(data[0]["pharmacy_latin_name"].as_str(), Some("El Chifa"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn pharmacies_list_returns_directory(pool: sqlx::PgPool) {
        seed_pharmacy(&pool, "El Chifa", "chifa@example.dz", 36.76, 3.06).await;
        seed_pharmacy(&pool, "Ibn Sina", "ibnsina@example.dz", 36.775, 3.058).await;

        let app = build_app(AppState { pool }, test_rate_limit());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/pharmacies")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["latin_name"].as_str(), Some("El Chifa"));
        assert!(data[0]["latitude"].is_f64());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok_with_live_database(pool: sqlx::PgPool) {
        let app = build_app(AppState { pool }, test_rate_limit());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert_eq!(json["data"]["database"].as_str(), Some("ok"));
    }
}
