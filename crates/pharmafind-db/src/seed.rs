use pharmafind_core::pharmacies::PharmacyConfig;
use sqlx::PgPool;

use crate::pharmacies::{upsert_pharmacy, NewPharmacy};
use crate::DbError;

/// Upsert pharmacies from config into the database, including their stock.
///
/// Returns the number of pharmacies processed (inserted or updated).
/// All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_pharmacies(pool: &PgPool, pharmacies: &[PharmacyConfig]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for pharmacy in pharmacies {
        let record = NewPharmacy {
            latin_name: pharmacy.latin_name.clone(),
            arabic_name: pharmacy.arabic_name.clone(),
            email: pharmacy.email.clone(),
            phone: pharmacy.phone.clone(),
            address: pharmacy.address.clone(),
            latitude: pharmacy.latitude,
            longitude: pharmacy.longitude,
        };
        let pharmacy_id = upsert_pharmacy(&mut *tx, &record).await?;

        for medication in &pharmacy.medications {
            sqlx::query(
                "INSERT INTO medications \
                     (pharmacy_id, latin_name, arabic_name, kind, price, size, dosage, prescription) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (pharmacy_id, latin_name) DO UPDATE SET \
                     arabic_name  = EXCLUDED.arabic_name, \
                     kind         = EXCLUDED.kind, \
                     price        = EXCLUDED.price, \
                     size         = EXCLUDED.size, \
                     dosage       = EXCLUDED.dosage, \
                     prescription = EXCLUDED.prescription, \
                     updated_at   = NOW()",
            )
            .bind(pharmacy_id)
            .bind(&medication.latin_name)
            .bind(&medication.arabic_name)
            .bind(&medication.kind)
            .bind(medication.price)
            .bind(&medication.size)
            .bind(&medication.dosage)
            .bind(medication.prescription)
            .execute(&mut *tx)
            .await?;
        }

        count += 1;
    }

    tx.commit().await?;
    Ok(count)
}
