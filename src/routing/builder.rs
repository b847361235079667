use thiserror::Error;
use tracing::{debug, info};

use crate::structures::{
    BusData, BusID, Catalogue, Edge, EdgeLabel, Graph, GraphError, RoutingSettings, StopID,
    VertexID,
};

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("no distance between '{from}' and '{to}' on bus '{bus}'")]
    MissingDistance {
        bus: String,
        from: String,
        to: String,
    },
    #[error("invalid routing settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Routing graph together with the per-edge labels used to present itineraries.
/// `labels[e]` describes the ride behind edge `e`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitGraph {
    pub graph: Graph,
    pub labels: Vec<EdgeLabel>,
}

/// Builds the routing graph of a catalogue.
///
/// Vertex `v` is the stop with id `v`. For every bus, every traversal it
/// performs and every pair of stops `i < j` of that traversal, one edge stands
/// for boarding at `i` and alighting at `j`, weighted with the wait time plus
/// the riding time of all segments in between. Edges are added bus by bus in
/// catalogue order, so the same catalogue always yields the same edge ids.
pub fn build_graph(
    catalogue: &Catalogue,
    settings: &RoutingSettings,
) -> Result<TransitGraph, BuildError> {
    validate_settings(settings)?;

    let mut graph = Graph::new(catalogue.stop_count());
    let mut labels = Vec::new();

    for (bus_index, bus) in catalogue.buses().iter().enumerate() {
        for traversal in bus.traversals() {
            let segment_times = segment_times(catalogue, settings, bus, &traversal)?;

            for i in 0..traversal.len() {
                let mut riding_time = 0.0;
                for j in i + 1..traversal.len() {
                    riding_time += segment_times[j - 1];

                    let id = graph.add_edge(Edge {
                        from: VertexID(traversal[i].0),
                        to: VertexID(traversal[j].0),
                        weight: settings.bus_wait_time + riding_time,
                    })?;
                    debug_assert_eq!(id.0, labels.len());
                    labels.push(EdgeLabel {
                        bus: BusID(bus_index),
                        span_count: j - i,
                    });
                }
            }
        }
        debug!("Bus '{}' expanded, {} edges so far", bus.name, labels.len());
    }

    info!(
        "Routing graph built: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    Ok(TransitGraph { graph, labels })
}

fn validate_settings(settings: &RoutingSettings) -> Result<(), BuildError> {
    if !settings.bus_velocity.is_finite() || settings.bus_velocity <= 0.0 {
        return Err(BuildError::InvalidSettings(format!(
            "bus_velocity must be positive, got {}",
            settings.bus_velocity
        )));
    }
    if !settings.bus_wait_time.is_finite() || settings.bus_wait_time < 0.0 {
        return Err(BuildError::InvalidSettings(format!(
            "bus_wait_time must not be negative, got {}",
            settings.bus_wait_time
        )));
    }
    Ok(())
}

/// Riding time in minutes of each consecutive segment of `traversal`.
fn segment_times(
    catalogue: &Catalogue,
    settings: &RoutingSettings,
    bus: &BusData,
    traversal: &[StopID],
) -> Result<Vec<f64>, BuildError> {
    traversal
        .windows(2)
        .map(|pair| match catalogue.distance(pair[0], pair[1]) {
            Some(meters) => Ok(meters as f64 / settings.meters_per_minute()),
            None => Err(BuildError::MissingDistance {
                bus: bus.name.clone(),
                from: stop_name(catalogue, pair[0]),
                to: stop_name(catalogue, pair[1]),
            }),
        })
        .collect()
}

fn stop_name(catalogue: &Catalogue, id: StopID) -> String {
    catalogue
        .get_stop(id)
        .map(|stop| stop.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{EdgeID, LatLng};

    const ORIGIN: LatLng = LatLng {
        latitude: 0.0,
        longitude: 0.0,
    };

    fn settings() -> RoutingSettings {
        RoutingSettings {
            bus_wait_time: 5.0,
            bus_velocity: 60.0,
        }
    }

    fn line_catalogue(is_roundtrip: bool) -> Catalogue {
        let mut c = Catalogue::new();
        let a = c.add_stop("A", ORIGIN);
        let b = c.add_stop("B", ORIGIN);
        let stop_c = c.add_stop("C", ORIGIN);
        c.set_distance(a, b, 1000);
        c.set_distance(b, stop_c, 2000);
        c.add_bus("14", &["A", "B", "C"], is_roundtrip).unwrap();
        c
    }

    #[test]
    fn one_edge_per_pair_of_a_roundtrip() {
        let built = build_graph(&line_catalogue(true), &settings()).unwrap();
        let g = &built.graph;

        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);

        let ac = g.get_edge(EdgeID(1)).unwrap();
        assert_eq!((ac.from, ac.to), (VertexID(0), VertexID(2)));
        assert!((ac.weight - 8.0).abs() < 1e-9);

        assert!((g.get_edge(EdgeID(0)).unwrap().weight - 6.0).abs() < 1e-9);
        assert!((g.get_edge(EdgeID(2)).unwrap().weight - 7.0).abs() < 1e-9);

        assert_eq!(
            built.labels,
            vec![
                EdgeLabel {
                    bus: BusID(0),
                    span_count: 1
                },
                EdgeLabel {
                    bus: BusID(0),
                    span_count: 2
                },
                EdgeLabel {
                    bus: BusID(0),
                    span_count: 1
                },
            ]
        );
    }

    #[test]
    fn linear_bus_rides_back_using_reverse_distances() {
        let mut c = line_catalogue(false);
        let b = c.stop_id("B").unwrap();
        let a = c.stop_id("A").unwrap();
        c.set_distance(b, a, 3000);

        let built = build_graph(&c, &settings()).unwrap();
        let g = &built.graph;
        assert_eq!(g.edge_count(), 6);
        assert_eq!(built.labels.len(), 6);

        // Backward traversal is C, B, A: C->B uses the declared B->C distance,
        // B->A has its own.
        let cb = g.get_edge(EdgeID(3)).unwrap();
        assert_eq!((cb.from, cb.to), (VertexID(2), VertexID(1)));
        assert!((cb.weight - 7.0).abs() < 1e-9);

        let ca = g.get_edge(EdgeID(4)).unwrap();
        assert_eq!((ca.from, ca.to), (VertexID(2), VertexID(0)));
        assert!((ca.weight - 10.0).abs() < 1e-9);

        for edge in g.edges() {
            assert!(edge.weight >= 0.0);
        }
    }

    #[test]
    fn missing_distance_aborts() {
        let mut c = Catalogue::new();
        c.add_stop("A", ORIGIN);
        c.add_stop("B", ORIGIN);
        c.add_bus("7", &["A", "B"], true).unwrap();

        assert_eq!(
            build_graph(&c, &settings()),
            Err(BuildError::MissingDistance {
                bus: "7".to_string(),
                from: "A".to_string(),
                to: "B".to_string(),
            })
        );
    }

    #[test]
    fn rejects_non_positive_velocity() {
        let bad = RoutingSettings {
            bus_wait_time: 1.0,
            bus_velocity: 0.0,
        };
        assert!(matches!(
            build_graph(&line_catalogue(true), &bad),
            Err(BuildError::InvalidSettings(_))
        ));
    }
}
