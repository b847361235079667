use std::fs;

use postcard::{from_bytes, to_allocvec};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    routing::{RestoreError, RouteEntry, RoutesTable, TransportRouter},
    structures::{Catalogue, Edge, EdgeID, Graph, LatLng, RoutingSettings, StopID, VertexID},
};

/// Everything needed to answer queries without rebuilding: the catalogue, the
/// routing settings, the routing graph and the precomputed routes table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub catalogue: CatalogueRecord,
    pub routing_settings: RoutingSettings,
    pub graph: GraphRecord,
    pub routes: RoutesTableRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueRecord {
    pub stops: Vec<StopRecord>,
    pub buses: Vec<BusRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distances: Vec<DistanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRecord {
    pub to: u32,
    pub meters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusRecord {
    pub name: String,
    pub is_roundtrip: bool,
    pub stops: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub vertex_count: u32,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: u32,
    pub to: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutesTableRecord {
    pub rows: Vec<RouteListRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteListRecord {
    pub cells: Vec<Option<RouteRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub weight: f64,
    pub prev_edge: Option<u32>,
}

/// Ids are stored as `u32`; larger catalogues cannot be persisted.
fn to_record_id(id: usize, what: &str) -> Result<u32, String> {
    u32::try_from(id).map_err(|_| format!("{what} {id} does not fit in a snapshot"))
}

pub fn encode_catalogue(catalogue: &Catalogue) -> Result<CatalogueRecord, String> {
    let mut stops: Vec<StopRecord> = catalogue
        .stops()
        .iter()
        .map(|stop| StopRecord {
            name: stop.name.clone(),
            latitude: stop.lat_lng.latitude,
            longitude: stop.lat_lng.longitude,
            distances: Vec::new(),
        })
        .collect();

    for (from, to, meters) in catalogue.distances() {
        stops[from.0].distances.push(DistanceRecord {
            to: to_record_id(to.0, "stop")?,
            meters,
        });
    }

    let buses = catalogue
        .buses()
        .iter()
        .map(|bus| -> Result<BusRecord, String> {
            Ok(BusRecord {
                name: bus.name.clone(),
                is_roundtrip: bus.is_roundtrip,
                stops: bus
                    .stops
                    .iter()
                    .map(|id| to_record_id(id.0, "stop"))
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect::<Result<_, String>>()?;

    Ok(CatalogueRecord { stops, buses })
}

pub fn decode_catalogue(record: &CatalogueRecord) -> Result<Catalogue, RestoreError> {
    let mut catalogue = Catalogue::new();
    let stop_count = record.stops.len();

    for (index, stop) in record.stops.iter().enumerate() {
        let id = catalogue.add_stop(
            &stop.name,
            LatLng {
                latitude: stop.latitude,
                longitude: stop.longitude,
            },
        );
        if id.0 != index {
            return Err(RestoreError::Decode(format!(
                "stop '{}' is stored twice",
                stop.name
            )));
        }
    }

    for (from, stop) in record.stops.iter().enumerate() {
        for distance in &stop.distances {
            let to = stop_index(distance.to, stop_count)?;
            catalogue.set_distance(StopID(from), to, distance.meters);
        }
    }

    for bus in &record.buses {
        let stops = bus
            .stops
            .iter()
            .map(|&id| stop_index(id, stop_count))
            .collect::<Result<Vec<_>, _>>()?;
        catalogue.add_bus_stops(&bus.name, stops, bus.is_roundtrip);
    }

    Ok(catalogue)
}

fn stop_index(id: u32, stop_count: usize) -> Result<StopID, RestoreError> {
    if (id as usize) < stop_count {
        Ok(StopID(id as usize))
    } else {
        Err(RestoreError::Decode(format!(
            "stop {id} is out of range ({stop_count} stops)"
        )))
    }
}

pub fn encode_graph(graph: &Graph) -> Result<GraphRecord, String> {
    Ok(GraphRecord {
        vertex_count: to_record_id(graph.vertex_count(), "vertex count")?,
        edges: graph
            .edges()
            .iter()
            .map(|edge| -> Result<EdgeRecord, String> {
                Ok(EdgeRecord {
                    from: to_record_id(edge.from.0, "vertex")?,
                    to: to_record_id(edge.to.0, "vertex")?,
                    weight: edge.weight,
                })
            })
            .collect::<Result<_, _>>()?,
    })
}

/// Re-adds the stored edges in order, so every edge gets back its id.
/// `vertex_count` is trusted here; [`decode_snapshot`] checks it against the stops.
pub fn decode_graph(record: &GraphRecord) -> Result<Graph, RestoreError> {
    let mut graph = Graph::new(record.vertex_count as usize);

    for edge in &record.edges {
        graph.add_edge(Edge {
            from: VertexID(edge.from as usize),
            to: VertexID(edge.to as usize),
            weight: edge.weight,
        })?;
    }

    Ok(graph)
}

pub fn encode_routes(table: &RoutesTable) -> Result<RoutesTableRecord, String> {
    let rows = table
        .rows()
        .map(|row| -> Result<RouteListRecord, String> {
            let cells = row
                .iter()
                .map(|cell| {
                    cell.map(|entry| -> Result<RouteRecord, String> {
                        Ok(RouteRecord {
                            weight: entry.weight,
                            prev_edge: entry
                                .prev_edge
                                .map(|id| to_record_id(id.0, "edge"))
                                .transpose()?,
                        })
                    })
                    .transpose()
                })
                .collect::<Result<_, String>>()?;
            Ok(RouteListRecord { cells })
        })
        .collect::<Result<_, String>>()?;

    Ok(RoutesTableRecord { rows })
}

/// Rebuilds the dense table as stored. The table is not relaxed again, its
/// consistency with the graph is checked by [`crate::routing::Router::restore`].
pub fn decode_routes(record: &RoutesTableRecord) -> Result<RoutesTable, RestoreError> {
    let rows = record
        .rows
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| {
                    cell.as_ref().map(|route| RouteEntry {
                        weight: route.weight,
                        prev_edge: route.prev_edge.map(|id| EdgeID(id as usize)),
                    })
                })
                .collect()
        })
        .collect();

    RoutesTable::from_rows(rows)
}

pub fn encode_snapshot(router: &TransportRouter) -> Result<Snapshot, String> {
    Ok(Snapshot {
        catalogue: encode_catalogue(router.catalogue())?,
        routing_settings: *router.settings(),
        graph: encode_graph(router.router().graph())?,
        routes: encode_routes(router.router().table())?,
    })
}

/// Vertices are stops, so the graph and the table must both be sized by the
/// stored stop count. Checked before anything is allocated from the record.
fn check_dimensions(snapshot: &Snapshot) -> Result<(), RestoreError> {
    let expected = snapshot.catalogue.stops.len();

    let vertex_count = snapshot.graph.vertex_count as usize;
    if vertex_count != expected {
        return Err(RestoreError::DimensionMismatch {
            expected,
            found: vertex_count,
        });
    }
    if snapshot.routes.rows.len() != expected {
        return Err(RestoreError::DimensionMismatch {
            expected,
            found: snapshot.routes.rows.len(),
        });
    }
    Ok(())
}

pub fn decode_snapshot(snapshot: &Snapshot) -> Result<TransportRouter, RestoreError> {
    check_dimensions(snapshot)?;

    let catalogue = decode_catalogue(&snapshot.catalogue)?;
    let graph = decode_graph(&snapshot.graph)?;
    let table = decode_routes(&snapshot.routes)?;

    TransportRouter::restore(catalogue, snapshot.routing_settings, graph, table)
}

pub fn snapshot_to_bytes(router: &TransportRouter) -> Result<Vec<u8>, String> {
    to_allocvec(&encode_snapshot(router)?).map_err(|e| format!("Failed to serialize router: {e}"))
}

pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<TransportRouter, RestoreError> {
    let snapshot: Snapshot = from_bytes(bytes).map_err(|e| RestoreError::Decode(e.to_string()))?;
    decode_snapshot(&snapshot)
}

pub fn save_router(router: &TransportRouter, path: &str) -> Result<(), String> {
    let bytes = snapshot_to_bytes(router)?;
    fs::write(path, &bytes).map_err(|e| format!("Failed to save router: {e}"))?;
    info!("Router saved to {} ({} bytes)", path, bytes.len());
    Ok(())
}

pub fn load_router(path: &str) -> Result<TransportRouter, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read router file: {e}"))?;
    let router =
        snapshot_from_bytes(&bytes).map_err(|e| format!("Failed to restore router: {e}"))?;
    info!("Router restored from {}", path);
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RoutingSettings {
        RoutingSettings {
            bus_wait_time: 6.0,
            bus_velocity: 40.0,
        }
    }

    fn router() -> TransportRouter {
        let mut c = Catalogue::new();
        let names = ["Airport", "Harbour", "Museum", "Station", "Park"];
        let ids: Vec<StopID> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                c.add_stop(
                    name,
                    LatLng {
                        latitude: 55.6 + i as f64 * 0.01,
                        longitude: 37.6,
                    },
                )
            })
            .collect();

        c.set_distance(ids[0], ids[1], 2600);
        c.set_distance(ids[1], ids[0], 2500);
        c.set_distance(ids[1], ids[2], 890);
        c.set_distance(ids[2], ids[3], 1500);
        c.set_distance(ids[3], ids[1], 1300);
        c.set_distance(ids[4], ids[4], 10);

        c.add_bus("297", &["Airport", "Harbour", "Museum"], false)
            .unwrap();
        c.add_bus("635", &["Museum", "Station", "Harbour", "Museum"], true)
            .unwrap();

        TransportRouter::new(c, settings()).unwrap()
    }

    #[test]
    fn graph_and_table_survive_a_round_trip() {
        let built = router();
        let bytes = snapshot_to_bytes(&built).unwrap();
        let restored = snapshot_from_bytes(&bytes).unwrap();

        assert_eq!(restored.router(), built.router());
        assert_eq!(restored.settings(), built.settings());
        assert_eq!(
            encode_catalogue(restored.catalogue()).unwrap(),
            encode_catalogue(built.catalogue()).unwrap()
        );

        let names: Vec<String> = built
            .catalogue()
            .stops()
            .iter()
            .map(|stop| stop.name.clone())
            .collect();
        for from in &names {
            for to in &names {
                assert_eq!(
                    restored.find_route(from, to),
                    built.find_route(from, to)
                );
            }
        }
    }

    #[test]
    fn empty_cells_are_stored_as_absent() {
        let built = router();
        let record = encode_routes(built.router().table()).unwrap();

        assert_eq!(record.rows.len(), 5);
        for (i, row) in record.rows.iter().enumerate() {
            assert_eq!(row.cells.len(), 5);
            assert!(row.cells[i].is_none());
        }
        // Park is only connected to itself.
        assert!(record.rows[4].cells.iter().all(Option::is_none));
    }

    #[test]
    fn decoded_graph_keeps_edge_ids() {
        let built = router();
        let graph = built.router().graph();
        let decoded = decode_graph(&encode_graph(graph).unwrap()).unwrap();

        assert_eq!(&decoded, graph);
        for id in (0..graph.edge_count()).map(EdgeID) {
            assert_eq!(decoded.get_edge(id), graph.get_edge(id));
        }
    }

    #[test]
    fn rejects_edges_outside_the_vertex_range() {
        let record = GraphRecord {
            vertex_count: 2,
            edges: vec![EdgeRecord {
                from: 0,
                to: 2,
                weight: 1.0,
            }],
        };

        assert!(matches!(
            decode_graph(&record),
            Err(RestoreError::Graph(_))
        ));
    }

    #[test]
    fn corrupted_snapshot_is_rejected_as_a_whole() {
        let built = router();

        let mut snapshot = encode_snapshot(&built).unwrap();
        snapshot.routes.rows[1].cells.pop();
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(RestoreError::RowLength { .. })
        ));

        let mut snapshot = encode_snapshot(&built).unwrap();
        snapshot.routes.rows.pop();
        assert_eq!(
            decode_snapshot(&snapshot).err(),
            Some(RestoreError::DimensionMismatch {
                expected: 5,
                found: 4
            })
        );

        let mut snapshot = encode_snapshot(&built).unwrap();
        let cell = snapshot.routes.rows[0]
            .cells
            .iter_mut()
            .flatten()
            .next()
            .unwrap();
        cell.prev_edge = Some(built.router().graph().edge_count() as u32);
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(RestoreError::EdgeOutOfRange { .. })
        ));

        let mut snapshot = encode_snapshot(&built).unwrap();
        snapshot.graph.edges.pop();
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(RestoreError::GraphMismatch(_))
        ));

        let mut snapshot = encode_snapshot(&built).unwrap();
        snapshot.catalogue.buses[0].stops[0] = 17;
        assert!(matches!(
            decode_snapshot(&snapshot),
            Err(RestoreError::Decode(_))
        ));

        assert!(matches!(
            snapshot_from_bytes(&[0xff, 0xff, 0xff]),
            Err(RestoreError::Decode(_))
        ));
    }

    #[test]
    fn oversized_vertex_count_is_rejected_before_allocating() {
        let built = router();

        let mut snapshot = encode_snapshot(&built).unwrap();
        snapshot.graph.vertex_count = u32::MAX;
        assert_eq!(
            decode_snapshot(&snapshot).err(),
            Some(RestoreError::DimensionMismatch {
                expected: 5,
                found: u32::MAX as usize
            })
        );

        let bytes = to_allocvec(&snapshot).unwrap();
        assert!(snapshot_from_bytes(&bytes).is_err());
    }

    #[test]
    fn ids_beyond_u32_are_not_truncated() {
        assert_eq!(to_record_id(7, "stop"), Ok(7));
        assert_eq!(to_record_id(u32::MAX as usize, "edge"), Ok(u32::MAX));
        assert!(to_record_id(u32::MAX as usize + 1, "edge").is_err());
    }
}
