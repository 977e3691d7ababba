//! Database operations for the `medications` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Input record for inserting a medication into a pharmacy's stock.
#[derive(Debug, Clone)]
pub struct NewMedication {
    pub pharmacy_id: i64,
    pub latin_name: String,
    pub arabic_name: String,
    pub kind: String,
    pub price: Decimal,
    pub size: Option<String>,
    pub dosage: Option<String>,
    pub prescription: bool,
}

/// A row from the `medications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MedicationRow {
    pub id: i64,
    pub pharmacy_id: i64,
    pub latin_name: String,
    pub arabic_name: String,
    pub kind: String,
    pub price: Decimal,
    pub size: Option<String>,
    pub dosage: Option<String>,
    pub prescription: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Medication search row joined with the stocking pharmacy's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MedicationSearchRow {
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

/// Search the medication catalogue.
///
/// If `term` is provided, filters case-insensitively on the latin or arabic
/// name with substring semantics (same match rule as the nearest-pharmacy
/// lookup); otherwise returns the whole catalogue up to `limit`.
///
/// Results are ordered by latin name, then id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn search_medications(
    pool: &PgPool,
    term: Option<&str>,
    limit: i64,
) -> Result<Vec<MedicationSearchRow>, sqlx::Error> {
    if let Some(term) = term {
        sqlx::query_as::<_, MedicationSearchRow>(
            "SELECT m.id, m.latin_name, m.arabic_name, m.kind, m.price, m.size, \
                    m.dosage, m.prescription, m.pharmacy_id, \
                    p.latin_name AS pharmacy_latin_name \
             FROM medications m \
             JOIN pharmacies p ON p.id = m.pharmacy_id \
             WHERE m.latin_name ILIKE '%' || $1 || '%' \
                OR m.arabic_name ILIKE '%' || $1 || '%' \
             ORDER BY m.latin_name, m.id \
             LIMIT $2",
        )
        .bind(term)
        .bind(limit)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, MedicationSearchRow>(
            "SELECT m.id, m.latin_name, m.arabic_name, m.kind, m.price, m.size, \
                    m.dosage, m.prescription, m.pharmacy_id, \
                    p.latin_name AS pharmacy_latin_name \
             FROM medications m \
             JOIN pharmacies p ON p.id = m.pharmacy_id \
             ORDER BY m.latin_name, m.id \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Insert a medication into a pharmacy's stock and return its id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails (including a unique violation
/// on `(pharmacy_id, latin_name)`).
pub async fn insert_medication(
    pool: &PgPool,
    medication: &NewMedication,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO medications \
             (pharmacy_id, latin_name, arabic_name, kind, price, size, dosage, prescription) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(medication.pharmacy_id)
    .bind(&medication.latin_name)
    .bind(&medication.arabic_name)
    .bind(&medication.kind)
    .bind(medication.price)
    .bind(&medication.size)
    .bind(&medication.dosage)
    .bind(medication.prescription)
    .fetch_one(pool)
    .await
}
