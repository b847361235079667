use std::time::SystemTime;

use tracing::{error, info};

use crate::{
    ingestion::{catalogue::load_catalogue_file, gtfs::load_gtfs},
    routing::TransportRouter,
    structures::{BuildConfig, Catalogue, Config, Ingestor},
};

pub fn build_catalogue(config: &BuildConfig) -> Result<Catalogue, String> {
    let mut catalogue = Catalogue::new();

    let mut ordered: Vec<&Ingestor> = config.inputs.iter().collect();
    ordered.sort_by_key(|i| i.phase());

    for input in ordered {
        info!("Loading '{}'...", input.label());
        let before = SystemTime::now();

        let path = input.resolve_path().inspect_err(|e| {
            error!("Failed to resolve '{}': {e}", input.label());
        })?;

        let result = match input {
            Ingestor::CatalogueYaml(_) => load_catalogue_file(&path, &mut catalogue),
            Ingestor::GtfsGeneric(_) => {
                load_gtfs(&path, &mut catalogue).map_err(|e| e.to_string())
            }
        };

        match result {
            Ok(_) => {
                if let Ok(elapsed) = before.elapsed() {
                    info!("Loaded '{}' in {}ms", input.label(), elapsed.as_millis());
                }
            }
            Err(e) => {
                error!("Failed to ingest '{}': {e}", input.label());
                return Err(format!("Failed to ingest '{}': {e}", input.label()));
            }
        }
    }

    Ok(catalogue)
}

/// Ingests every configured input and computes the routes table.
pub fn build_router(config: &Config) -> Result<TransportRouter, String> {
    let catalogue = build_catalogue(&config.build)?;
    info!(
        "Catalogue ready: {} stops, {} buses",
        catalogue.stop_count(),
        catalogue.buses().len()
    );

    TransportRouter::new(catalogue, config.routing)
        .map_err(|e| format!("Failed to build routing graph: {e}"))
}
