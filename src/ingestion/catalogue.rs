use std::{collections::BTreeMap, fs};

use serde::Deserialize;
use tracing::info;

use crate::structures::{Catalogue, LatLng};

#[derive(Debug, Deserialize)]
struct CatalogueDocument {
    #[serde(default)]
    stops: Vec<StopDocument>,
    #[serde(default)]
    buses: Vec<BusDocument>,
}

#[derive(Debug, Deserialize)]
struct StopDocument {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    road_distances: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct BusDocument {
    name: String,
    stops: Vec<String>,
    is_roundtrip: bool,
}

pub fn load_catalogue_file(path: &str, catalogue: &mut Catalogue) -> Result<(), String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read catalogue: {e}"))?;
    load_catalogue(&content, catalogue)
}

/// Loads a YAML catalogue. Stops come first, then road distances (which may
/// point to any stop of the document), then bus lines.
pub fn load_catalogue(content: &str, catalogue: &mut Catalogue) -> Result<(), String> {
    let document: CatalogueDocument =
        serde_yml::from_str(content).map_err(|e| format!("Failed to parse catalogue: {e}"))?;

    for stop in &document.stops {
        catalogue.add_stop(
            &stop.name,
            LatLng {
                latitude: stop.latitude,
                longitude: stop.longitude,
            },
        );
    }

    let mut count_distances = 0;
    for stop in &document.stops {
        let Some(from) = catalogue.stop_id(&stop.name) else {
            continue;
        };
        for (to_name, &meters) in &stop.road_distances {
            let to = catalogue.stop_id(to_name).ok_or_else(|| {
                format!(
                    "Stop '{}' has a distance to unknown stop '{to_name}'",
                    stop.name
                )
            })?;
            catalogue.set_distance(from, to, meters);
            count_distances += 1;
        }
    }

    for bus in &document.buses {
        let stops: Vec<&str> = bus.stops.iter().map(String::as_str).collect();
        catalogue.add_bus(&bus.name, &stops, bus.is_roundtrip)?;
    }

    info!(
        "{} stops, {} distances and {} buses loaded",
        document.stops.len(),
        count_distances,
        document.buses.len()
    );

    Ok(())
}
