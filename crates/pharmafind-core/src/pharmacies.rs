//! Pharmacy seed-file model (`config/pharmacies.yaml`).
//!
//! The seed file describes pharmacies with their contact details, coordinate
//! and stocked medications. Loading validates everything the database schema
//! cannot: coordinate ranges, duplicate identities, empty names.

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationConfig {
    pub latin_name: String,
    pub arabic_name: String,
    pub kind: String,
    pub price: Decimal,
    pub size: Option<String>,
    pub dosage: Option<String>,
    #[serde(default)]
    pub prescription: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyConfig {
    pub latin_name: String,
    pub arabic_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub medications: Vec<MedicationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PharmaciesFile {
    pub pharmacies: Vec<PharmacyConfig>,
}

/// Load and validate the pharmacies configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pharmacies(path: &Path) -> Result<PharmaciesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PharmaciesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let pharmacies_file: PharmaciesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::PharmaciesFileParse)?;

    validate_pharmacies(&pharmacies_file)?;

    Ok(pharmacies_file)
}

fn validate_pharmacies(file: &PharmaciesFile) -> Result<(), ConfigError> {
    let mut seen_emails = HashSet::new();

    for pharmacy in &file.pharmacies {
        if pharmacy.latin_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "pharmacy latin_name must be non-empty".to_string(),
            ));
        }

        if pharmacy.email.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' has an empty email",
                pharmacy.latin_name
            )));
        }

        // Email is the upsert key in the seed path.
        let lower_email = pharmacy.email.to_lowercase();
        if !seen_emails.insert(lower_email) {
            return Err(ConfigError::Validation(format!(
                "duplicate pharmacy email: '{}'",
                pharmacy.email
            )));
        }

        if let Err(e) = Coordinate::new(pharmacy.latitude, pharmacy.longitude) {
            return Err(ConfigError::Validation(format!(
                "pharmacy '{}' has an invalid coordinate: {e}",
                pharmacy.latin_name
            )));
        }

        let mut seen_medications = HashSet::new();
        for medication in &pharmacy.medications {
            if medication.latin_name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "pharmacy '{}' has a medication with an empty latin_name",
                    pharmacy.latin_name
                )));
            }

            if !seen_medications.insert(medication.latin_name.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "pharmacy '{}' lists medication '{}' twice",
                    pharmacy.latin_name, medication.latin_name
                )));
            }
        }
    }

    Ok(())
}
