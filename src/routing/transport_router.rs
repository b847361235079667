use thiserror::Error;
use tracing::{debug, error};

use crate::{
    routing::{BuildError, RestoreError, RoutesTable, Router, TransitGraph, build_graph},
    structures::{
        Catalogue, EdgeLabel, Graph, RoutingSettings, StopID, VertexID,
        plan::{Plan, PlanBusItem, PlanItem, PlanWaitItem},
    },
};

const WEIGHT_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("unknown stop '{0}'")]
    UnknownStop(String),
}

/// Answers stop-to-stop itinerary queries over a catalogue.
///
/// Immutable once built; share it behind an `Arc` to query from several threads.
pub struct TransportRouter {
    catalogue: Catalogue,
    settings: RoutingSettings,
    router: Router,
    labels: Vec<EdgeLabel>,
}

impl TransportRouter {
    pub fn new(catalogue: Catalogue, settings: RoutingSettings) -> Result<Self, BuildError> {
        let TransitGraph { graph, labels } = build_graph(&catalogue, &settings)?;
        let router = Router::build(graph);

        Ok(TransportRouter {
            catalogue,
            settings,
            router,
            labels,
        })
    }

    /// Rebuilds a router from a stored graph and routes table without relaxing again.
    ///
    /// Edge labels are not stored: they are derived again from the catalogue,
    /// and the derived graph has to match the stored one edge for edge.
    pub fn restore(
        catalogue: Catalogue,
        settings: RoutingSettings,
        graph: Graph,
        table: RoutesTable,
    ) -> Result<Self, RestoreError> {
        let replayed = build_graph(&catalogue, &settings)
            .map_err(|e| RestoreError::GraphMismatch(e.to_string()))?;
        ensure_same_graph(&replayed.graph, &graph)?;

        let router = Router::restore(graph, table)?;

        Ok(TransportRouter {
            catalogue,
            settings,
            router,
            labels: replayed.labels,
        })
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Fastest itinerary between two stops, `None` when they are not connected.
    pub fn find_route(&self, from: &str, to: &str) -> Result<Option<Plan>, QueryError> {
        let from_id = self.lookup_stop(from)?;
        let to_id = self.lookup_stop(to)?;

        if from_id == to_id {
            return Ok(Some(Plan {
                total_time: 0.0,
                items: Vec::new(),
            }));
        }

        let Some(path) = self
            .router
            .find_route(VertexID(from_id.0), VertexID(to_id.0))
        else {
            debug!("No route between '{from}' and '{to}'");
            return Ok(None);
        };

        let mut items = Vec::with_capacity(path.edges.len() * 2);
        for edge_id in path.edges {
            let (Some(edge), Some(label)) =
                (self.router.graph().get_edge(edge_id), self.labels.get(edge_id.0))
            else {
                error!("Route '{from}' -> '{to}' uses edge {edge_id} with no edge or label");
                return Ok(None);
            };
            let bus = self
                .catalogue
                .get_bus(label.bus)
                .map(|bus| bus.name.clone())
                .unwrap_or_default();

            items.push(PlanItem::Wait(PlanWaitItem {
                stop_name: self.stop_name(StopID(edge.from.0)),
                time: self.settings.bus_wait_time,
            }));
            items.push(PlanItem::Bus(PlanBusItem {
                bus,
                from_stop: self.stop_name(StopID(edge.from.0)),
                to_stop: self.stop_name(StopID(edge.to.0)),
                span_count: label.span_count,
                time: edge.weight - self.settings.bus_wait_time,
            }));
        }

        Ok(Some(Plan {
            total_time: path.total_weight,
            items,
        }))
    }

    /// Name of the stop closest to the given coordinates.
    pub fn nearest_stop(&self, lat: f64, lng: f64) -> Option<&str> {
        let (_, id) = self.catalogue.nearest_stop(lat, lng)?;
        self.catalogue.get_stop(id).map(|stop| stop.name.as_str())
    }

    fn lookup_stop(&self, name: &str) -> Result<StopID, QueryError> {
        self.catalogue
            .stop_id(name)
            .ok_or_else(|| QueryError::UnknownStop(name.to_string()))
    }

    fn stop_name(&self, id: StopID) -> String {
        self.catalogue
            .get_stop(id)
            .map(|stop| stop.name.clone())
            .unwrap_or_default()
    }
}

fn ensure_same_graph(expected: &Graph, stored: &Graph) -> Result<(), RestoreError> {
    if expected.vertex_count() != stored.vertex_count() {
        return Err(RestoreError::GraphMismatch(format!(
            "{} vertices stored, catalogue has {}",
            stored.vertex_count(),
            expected.vertex_count()
        )));
    }
    if expected.edge_count() != stored.edge_count() {
        return Err(RestoreError::GraphMismatch(format!(
            "{} edges stored, catalogue yields {}",
            stored.edge_count(),
            expected.edge_count()
        )));
    }

    for (id, (a, b)) in expected.edges().iter().zip(stored.edges()).enumerate() {
        if a.from != b.from || a.to != b.to || (a.weight - b.weight).abs() > WEIGHT_TOLERANCE {
            return Err(RestoreError::GraphMismatch(format!(
                "edge {id} differs: stored {} -> {} ({}), expected {} -> {} ({})",
                b.from, b.to, b.weight, a.from, a.to, a.weight
            )));
        }
    }

    Ok(())
}
