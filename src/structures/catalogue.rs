use std::collections::{BTreeSet, HashMap};

use kdtree::KdTree;

use crate::structures::{BusData, BusID, BusStat, LatLng, StopData, StopID, StopInfo};

/// Immutable-after-load store of stops, bus lines and road distances.
///
/// Stop ids are insertion indices, and the routing graph reuses them as
/// vertex ids, so the insertion order must be reproducible between runs.
pub struct Catalogue {
    stops: Vec<StopData>,
    buses: Vec<BusData>,
    distances: HashMap<(StopID, StopID), u32>,
    stops_tree: KdTree<f64, StopID, [f64; 2]>,
    stop_mapper: HashMap<String, StopID>,
    bus_mapper: HashMap<String, BusID>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalogue {
    pub fn new() -> Catalogue {
        Catalogue {
            stops: Vec::new(),
            buses: Vec::new(),
            distances: HashMap::new(),
            stops_tree: KdTree::new(2),
            stop_mapper: HashMap::new(),
            bus_mapper: HashMap::new(),
        }
    }

    /// Adds a stop, or returns the id of the stop already registered under that name.
    pub fn add_stop(&mut self, name: &str, lat_lng: LatLng) -> StopID {
        if let Some(&id) = self.stop_mapper.get(name) {
            return id;
        }

        let id = StopID(self.stops.len());
        self.stops.push(StopData {
            name: name.to_string(),
            lat_lng,
        });
        self.stop_mapper.insert(name.to_string(), id);

        if self.stops_tree.add(lat_lng.as_point(), id).is_err() {
            tracing::warn!("Stop '{name}' has invalid coordinates ({lat_lng})");
        }
        id
    }

    pub fn set_distance(&mut self, from: StopID, to: StopID, meters: u32) {
        self.distances.insert((from, to), meters);
    }

    /// Registers a bus line. Every stop must already be known.
    pub fn add_bus(
        &mut self,
        name: &str,
        stops: &[&str],
        is_roundtrip: bool,
    ) -> Result<BusID, String> {
        let stops = stops
            .iter()
            .map(|stop| {
                self.stop_id(stop)
                    .ok_or_else(|| format!("Bus '{name}' references unknown stop '{stop}'"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.add_bus_stops(name, stops, is_roundtrip))
    }

    pub(crate) fn add_bus_stops(
        &mut self,
        name: &str,
        stops: Vec<StopID>,
        is_roundtrip: bool,
    ) -> BusID {
        let id = BusID(self.buses.len());
        self.buses.push(BusData {
            name: name.to_string(),
            stops,
            is_roundtrip,
        });
        self.bus_mapper.insert(name.to_string(), id);
        id
    }

    pub fn stop_id(&self, name: &str) -> Option<StopID> {
        self.stop_mapper.get(name).copied()
    }

    pub fn bus_id(&self, name: &str) -> Option<BusID> {
        self.bus_mapper.get(name).copied()
    }

    pub fn get_stop(&self, id: StopID) -> Option<&StopData> {
        self.stops.get(id.0)
    }

    pub fn get_bus(&self, id: BusID) -> Option<&BusData> {
        self.buses.get(id.0)
    }

    pub fn stops(&self) -> &[StopData] {
        &self.stops
    }

    pub fn buses(&self) -> &[BusData] {
        &self.buses
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// Road distance in metres. Falls back to the reverse direction when only
    /// that one was declared.
    pub fn distance(&self, from: StopID, to: StopID) -> Option<u32> {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
    }

    pub fn has_explicit_distance(&self, from: StopID, to: StopID) -> bool {
        self.distances.contains_key(&(from, to))
    }

    /// Explicitly declared distances, sorted by stop pair.
    pub fn distances(&self) -> Vec<(StopID, StopID, u32)> {
        let mut distances: Vec<_> = self
            .distances
            .iter()
            .map(|(&(from, to), &meters)| (from, to, meters))
            .collect();
        distances.sort_unstable();
        distances
    }

    /// Statistics of a full run of the named bus.
    ///
    /// Segments without a declared road distance count their great-circle
    /// length. Curvature is 1 when the run has no geographic length.
    pub fn bus_stat(&self, name: &str) -> Option<BusStat> {
        let bus = self.bus_id(name).and_then(|id| self.get_bus(id))?;

        let stop_count = match (bus.is_roundtrip, bus.stops.len()) {
            (_, 0) => 0,
            (true, n) => n,
            (false, n) => 2 * n - 1,
        };
        let unique_stop_count = bus.stops.iter().collect::<BTreeSet<_>>().len();

        let mut route_length = 0.0;
        let mut geo_length = 0.0;
        for traversal in bus.traversals() {
            for pair in traversal.windows(2) {
                let (Some(a), Some(b)) = (self.get_stop(pair[0]), self.get_stop(pair[1])) else {
                    continue;
                };
                let geo = a.lat_lng.dist(b.lat_lng);
                geo_length += geo;
                route_length += self
                    .distance(pair[0], pair[1])
                    .map_or(geo, |meters| meters as f64);
            }
        }

        let curvature = if geo_length > 0.0 {
            route_length / geo_length
        } else {
            1.0
        };

        Some(BusStat {
            name: bus.name.clone(),
            stop_count,
            unique_stop_count,
            route_length,
            curvature,
        })
    }

    /// Buses serving the named stop, `None` when the stop is unknown.
    pub fn stop_info(&self, name: &str) -> Option<StopInfo> {
        let id = self.stop_id(name)?;

        let buses: BTreeSet<&str> = self
            .buses
            .iter()
            .filter(|bus| bus.stops.contains(&id))
            .map(|bus| bus.name.as_str())
            .collect();

        Some(StopInfo {
            name: name.to_string(),
            buses: buses.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn nearest_stop(&self, lat: f64, lng: f64) -> Option<(f64, StopID)> {
        match self.stops_tree.iter_nearest(&[lat, lng], &LatLng::distance) {
            Ok(mut it) => it.next().map(|(dist, id)| (dist, *id)),
            Err(e) => {
                tracing::warn!("Failed to look up the nearest stop: {e:?}");
                None
            }
        }
    }
}
