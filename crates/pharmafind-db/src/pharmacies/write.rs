//! Write operations for the `pharmacies` table.

use sqlx::PgPool;

use super::types::NewPharmacy;

/// Insert a pharmacy and return its id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails (including a unique violation
/// on `email`).
pub async fn insert_pharmacy(pool: &PgPool, pharmacy: &NewPharmacy) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO pharmacies \
             (latin_name, arabic_name, email, phone, address, latitude, longitude) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(&pharmacy.latin_name)
    .bind(&pharmacy.arabic_name)
    .bind(&pharmacy.email)
    .bind(&pharmacy.phone)
    .bind(&pharmacy.address)
    .bind(pharmacy.latitude)
    .bind(pharmacy.longitude)
    .fetch_one(pool)
    .await
}

/// Insert a pharmacy or update it in place when the email already exists.
///
/// Email is the stable identity used by the seed path; everything else is
/// overwritten from the input. Returns the pharmacy id either way.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_pharmacy(
    executor: impl sqlx::PgExecutor<'_>,
    pharmacy: &NewPharmacy,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO pharmacies \
             (latin_name, arabic_name, email, phone, address, latitude, longitude) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (email) DO UPDATE SET \
             latin_name  = EXCLUDED.latin_name, \
             arabic_name = EXCLUDED.arabic_name, \
             phone       = EXCLUDED.phone, \
             address     = EXCLUDED.address, \
             latitude    = EXCLUDED.latitude, \
             longitude   = EXCLUDED.longitude, \
             updated_at  = NOW() \
         RETURNING id",
    )
    .bind(&pharmacy.latin_name)
    .bind(&pharmacy.arabic_name)
    .bind(&pharmacy.email)
    .bind(&pharmacy.phone)
    .bind(&pharmacy.address)
    .bind(pharmacy.latitude)
    .bind(pharmacy.longitude)
    .fetch_one(executor)
    .await
}
