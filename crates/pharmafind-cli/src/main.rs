use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pharmafind_core::geo::Coordinate;
use pharmafind_core::resolver::{rank_pharmacies, ResolveError};

#[derive(Debug, Parser)]
#[command(name = "pharmafind-cli")]
#[command(about = "PharmaFind command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run pending database migrations.
    Migrate,
    /// Load the pharmacies seed file into the database.
    Seed {
        /// Seed file path; defaults to the configured pharmacies path.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Query the nearest pharmacies stocking a medication.
    Nearest {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long)]
        medication: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = pharmafind_core::load_app_config_from_env()?;
    let pool_config = pharmafind_db::PoolConfig::from_app_config(&config);
    let pool = pharmafind_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Migrate => {
            let applied = pharmafind_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Seed { file } => {
            let path = file.unwrap_or_else(|| config.pharmacies_path.clone());
            let seed = pharmafind_core::pharmacies::load_pharmacies(&path)?;
            pharmafind_db::run_migrations(&pool).await?;
            let count = pharmafind_db::seed_pharmacies(&pool, &seed.pharmacies).await?;
            println!("seeded {count} pharmacy(ies) from {}", path.display());
        }
        Commands::Nearest {
            lat,
            lng,
            medication,
        } => {
            let user = Coordinate::new(lat, lng)?;
            let rows = pharmafind_db::find_pharmacies_carrying(&pool, &medication).await?;
            let matches = rows.into_iter().map(Into::into).collect();
            match rank_pharmacies(user, matches) {
                Ok(ranked) => {
                    for entry in ranked {
                        println!(
                            "{:>9.2} km  {}  {}  [{}]",
                            entry.distance_km,
                            entry.pharmacy.latin_name,
                            entry.pharmacy.address,
                            entry.pharmacy.matched_medication,
                        );
                    }
                }
                Err(ResolveError::NoPharmaciesFound) => {
                    println!("no pharmacies found with the specified medication");
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn nearest_args_parse() {
        let cli = Cli::try_parse_from([
            "pharmafind-cli",
            "nearest",
            "--lat",
            "36.77",
            "--lng",
            "3.05",
            "--medication",
            "Paracetamol",
        ])
        .expect("args should parse");
        match cli.command {
            Commands::Nearest {
                lat,
                lng,
                medication,
            } => {
                assert!((lat - 36.77).abs() < 1e-9);
                assert!((lng - 3.05).abs() < 1e-9);
                assert_eq!(medication, "Paracetamol");
            }
            other => panic!("expected nearest subcommand, got {other:?}"),
        }
    }

    #[test]
    fn seed_defaults_to_configured_path() {
        let cli = Cli::try_parse_from(["pharmafind-cli", "seed"]).expect("args should parse");
        match cli.command {
            Commands::Seed { file } => assert!(file.is_none()),
            other => panic!("expected seed subcommand, got {other:?}"),
        }
    }
}
