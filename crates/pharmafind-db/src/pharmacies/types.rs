//! Row types for the `pharmacies` table.

use chrono::{DateTime, Utc};
use pharmafind_core::resolver::PharmacyMatch;
use uuid::Uuid;

/// Input record for inserting/upserting a pharmacy.
#[derive(Debug, Clone)]
pub struct NewPharmacy {
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A row from the `pharmacies` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PharmacyRow {
    pub id: i64,
    pub public_id: Uuid,
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row for the nearest-pharmacy lookup: pharmacy columns plus the latin
/// name of the medication that matched the search term.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PharmacyMatchRow {
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
}

impl From<PharmacyMatchRow> for PharmacyMatch {
    fn from(row: PharmacyMatchRow) -> Self {
        Self {
            id: row.id,
            public_id: row.public_id,
            latin_name: row.latin_name,
            arabic_name: row.arabic_name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            matched_medication: row.matched_medication,
        }
    }
}
