//! Domain core for PharmaFind: coordinates and great-circle distance, the
//! pure half of the nearest-pharmacy resolver, application configuration,
//! and the pharmacy seed-file model.
//!
//! Everything here is I/O-free except config/seed-file loading; database
//! access lives in `pharmafind-db` and HTTP in `pharmafind-server`.

mod app_config;
mod config;
pub mod geo;
pub mod pharmacies;
pub mod resolver;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read pharmacies file {path}")]
    PharmaciesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse pharmacies file")]
    PharmaciesFileParse(#[from] serde_yaml::Error),
    #[error("invalid pharmacies config: {0}")]
    Validation(String),
}
