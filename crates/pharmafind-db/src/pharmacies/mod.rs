//! Database operations for the `pharmacies` table.

mod read;
mod types;
mod write;

pub use read::{find_pharmacies_carrying, list_pharmacies};
pub use types::{NewPharmacy, PharmacyMatchRow, PharmacyRow};
pub use write::{insert_pharmacy, upsert_pharmacy};
