#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for plate lookups.
//!
//! Requires `NYC_OPEN_DATA_APP_TOKEN`. Set `GOOGLE_MAPS_API_KEY` to
//! geocode violations whose county and precinct are unknown.

use clap::{Parser, Subcommand};
use plate_lookup_orchestrator::{LookupRequest, LookupService};
use plate_lookup_source::registry::all_databases;

#[derive(Parser)]
#[command(name = "plate_lookup", about = "NYC parking and camera violation lookup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up every violation for a plate and print the result as JSON
    Lookup {
        /// License plate (or taxi medallion number)
        plate: String,
        /// Two-letter registration state
        #[arg(long, default_value = "NY")]
        state: String,
        /// Comma-separated plate types to restrict to (e.g., "PAS,COM")
        #[arg(long)]
        plate_types: Option<String>,
        /// Queue requests behind interactive lookups
        #[arg(long)]
        background: bool,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// List the violation tables that are queried
    Databases,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Databases => {
            let databases = all_databases();
            println!("{:<10} {:<12} {:<12} NAME", "ID", "RESOURCE", "SCHEMA");
            println!("{}", "-".repeat(80));
            for database in &databases {
                println!(
                    "{:<10} {:<12} {:<12} {}",
                    database.id,
                    database.resource_id,
                    database.schema.as_ref(),
                    database.name
                );
            }
        }
        Commands::Lookup {
            plate,
            state,
            plate_types,
            background,
            compact,
        } => {
            let service = LookupService::from_env()?;

            let plate_types: Vec<String> = plate_types
                .map(|types| {
                    types
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            let mut request = LookupRequest::new(plate, state).with_plate_types(plate_types);
            if background {
                request = request.in_background();
            }

            let result = match service.lookup(&request).await {
                Ok(result) => result,
                Err(e) if e.is_bad_gateway() => {
                    log::error!("Open data portal unavailable: {e}");
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };

            let json = if compact {
                serde_json::to_string(&result)?
            } else {
                serde_json::to_string_pretty(&result)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
