//! Read operations for the `pharmacies` table.

use sqlx::PgPool;

use super::types::{PharmacyMatchRow, PharmacyRow};

/// Query every pharmacy that stocks a medication matching `term`.
///
/// The match is a case-insensitive substring match against the medication's
/// latin OR arabic name; the term is bound as a parameter and wrapped in `%`
/// wildcards inside the statement, so "param" matches "Paracetamol".
/// User-supplied `%`/`_` keep their SQL wildcard meaning.
///
/// Rows come back ordered by pharmacy id so the resolver's stable sort has a
/// deterministic retrieval order to break distance ties with.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_pharmacies_carrying(
    pool: &PgPool,
    term: &str,
) -> Result<Vec<PharmacyMatchRow>, sqlx::Error> {
    sqlx::query_as::<_, PharmacyMatchRow>(
        "SELECT p.id, p.public_id, p.latin_name, p.arabic_name, p.email, p.phone, \
                p.address, p.latitude, p.longitude, \
                m.latin_name AS matched_medication \
         FROM pharmacies p \
         JOIN medications m ON m.pharmacy_id = p.id \
         WHERE m.latin_name ILIKE '%' || $1 || '%' \
            OR m.arabic_name ILIKE '%' || $1 || '%' \
         ORDER BY p.id",
    )
    .bind(term)
    .fetch_all(pool)
    .await
}

/// Return the full pharmacy directory, ordered by latin name.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_pharmacies(pool: &PgPool) -> Result<Vec<PharmacyRow>, sqlx::Error> {
    sqlx::query_as::<_, PharmacyRow>(
        "SELECT id, public_id, latin_name, arabic_name, email, phone, address, \
                latitude, longitude, created_at, updated_at \
         FROM pharmacies \
         ORDER BY latin_name",
    )
    .fetch_all(pool)
    .await
}
