use std::collections::{BTreeMap, HashMap};

use gtfs_structures::{DirectionType, Trip};
use tracing::info;

use crate::structures::{Catalogue, LatLng, StopID};

/// Imports a GTFS feed as bus lines.
///
/// Stops are added in GTFS id order and merged by name. Each route contributes
/// one line per direction, following the trip with the most stops (ties go to
/// the smallest trip id). Segment lengths are great-circle distances and never
/// override a distance that is already declared.
pub fn load_gtfs(gtfs_path: &str, catalogue: &mut Catalogue) -> Result<(), gtfs_structures::Error> {
    let gtfs = gtfs_structures::Gtfs::new(gtfs_path)?;

    let mut gtfs_stops_mapper = HashMap::<String, StopID>::new();

    let mut count_stop_no_latlng = 0;
    let mut count_stop_no_name = 0;

    let mut raw_stops: Vec<_> = gtfs.stops.values().collect();
    raw_stops.sort_unstable_by(|a, b| a.id.cmp(&b.id));

    for raw in raw_stops {
        let loc = match (raw.latitude, raw.longitude) {
            (Some(lat), Some(lng)) => LatLng {
                latitude: lat,
                longitude: lng,
            },
            _ => {
                count_stop_no_latlng += 1;
                continue;
            }
        };

        let name = match &raw.name {
            Some(name) => name,
            _ => {
                count_stop_no_name += 1;
                continue;
            }
        };

        let id = catalogue.add_stop(name, loc);
        gtfs_stops_mapper.insert(raw.id.clone(), id);
    }

    info!("{} stops parsed", gtfs.stops.len());
    info!(" - {} stops without geo data", count_stop_no_latlng);
    info!(" - {} stops without name", count_stop_no_name);

    let mut trips: Vec<&Trip> = gtfs.trips.values().collect();
    trips.sort_unstable_by(|a, b| a.id.cmp(&b.id));

    let mut representatives = BTreeMap::<(String, u8), &Trip>::new();
    for trip in trips {
        let direction = match trip.direction_id {
            Some(DirectionType::Inbound) => 1,
            _ => 0,
        };
        let current = representatives
            .entry((trip.route_id.clone(), direction))
            .or_insert(trip);
        if trip.stop_times.len() > current.stop_times.len() {
            *current = trip;
        }
    }

    let mut count_lines = 0;
    let mut count_line_too_short = 0;

    for ((route_id, direction), trip) in representatives {
        let mut stop_times: Vec<_> = trip.stop_times.iter().collect();
        stop_times.sort_unstable_by_key(|st| st.stop_sequence);

        let mut stops: Vec<StopID> = stop_times
            .iter()
            .filter_map(|st| gtfs_stops_mapper.get(&st.stop.id).copied())
            .collect();
        stops.dedup();

        if stops.len() < 2 {
            count_line_too_short += 1;
            continue;
        }

        for pair in stops.windows(2) {
            if catalogue.has_explicit_distance(pair[0], pair[1]) {
                continue;
            }
            if let (Some(a), Some(b)) = (catalogue.get_stop(pair[0]), catalogue.get_stop(pair[1]))
            {
                let meters = a.lat_lng.dist(b.lat_lng).round() as u32;
                catalogue.set_distance(pair[0], pair[1], meters);
            }
        }

        let route_name = gtfs
            .routes
            .get(&route_id)
            .and_then(|route| {
                route
                    .short_name
                    .clone()
                    .or(route.long_name.clone())
                    .filter(|name| !name.is_empty())
            })
            .unwrap_or(route_id);
        let name = if direction == 1 {
            format!("{route_name} (return)")
        } else {
            route_name
        };

        catalogue.add_bus_stops(&name, stops, true);
        count_lines += 1;
    }

    info!("{} bus lines imported", count_lines);
    info!(" - {} trips with less than two known stops", count_line_too_short);

    Ok(())
}
