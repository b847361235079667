use std::time::SystemTime;

use thiserror::Error;
use tracing::{error, info};

use crate::structures::{EdgeID, Graph, GraphError, VertexID};

#[derive(Debug, Error, PartialEq)]
pub enum RestoreError {
    #[error("failed to decode snapshot: {0}")]
    Decode(String),
    #[error("routes table has {found} rows, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("routes table row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid edge in snapshot: {0}")]
    Graph(#[from] GraphError),
    #[error("route {from} -> {to} has an invalid weight {weight}")]
    InvalidWeight {
        from: VertexID,
        to: VertexID,
        weight: f64,
    },
    #[error("route {from} -> {to} references unknown edge {edge}")]
    EdgeOutOfRange {
        from: VertexID,
        to: VertexID,
        edge: EdgeID,
    },
    #[error("route {from} -> {to} ends with edge {edge} which does not lead to {to}")]
    PrevEdgeMismatch {
        from: VertexID,
        to: VertexID,
        edge: EdgeID,
    },
    #[error("route {from} -> {to} has no previous edge")]
    MissingPrevEdge { from: VertexID, to: VertexID },
    #[error("routes table has an entry for {0} -> {0}")]
    DiagonalEntry(VertexID),
    #[error("stored graph does not match the catalogue: {0}")]
    GraphMismatch(String),
}

/// Best known way to reach one vertex from another: the total weight and the
/// last edge taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEntry {
    pub weight: f64,
    pub prev_edge: Option<EdgeID>,
}

/// Dense `vertex_count × vertex_count` matrix of [`RouteEntry`], stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutesTable {
    vertex_count: usize,
    entries: Vec<Option<RouteEntry>>,
}

impl RoutesTable {
    pub fn new(vertex_count: usize) -> RoutesTable {
        RoutesTable {
            vertex_count,
            entries: vec![None; vertex_count * vertex_count],
        }
    }

    /// Builds a table from its rows. Every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<Option<RouteEntry>>>) -> Result<RoutesTable, RestoreError> {
        let vertex_count = rows.len();
        let mut entries = Vec::with_capacity(vertex_count * vertex_count);

        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != vertex_count {
                return Err(RestoreError::RowLength {
                    row,
                    expected: vertex_count,
                    found: cells.len(),
                });
            }
            entries.extend(cells);
        }

        Ok(RoutesTable {
            vertex_count,
            entries,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn get(&self, from: VertexID, to: VertexID) -> Option<&RouteEntry> {
        self.index(from, to)
            .and_then(|index| self.entries[index].as_ref())
    }

    fn set(&mut self, from: VertexID, to: VertexID, entry: RouteEntry) {
        if let Some(index) = self.index(from, to) {
            self.entries[index] = Some(entry);
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Option<RouteEntry>]> + '_ {
        self.entries.chunks(self.vertex_count.max(1))
    }

    fn index(&self, from: VertexID, to: VertexID) -> Option<usize> {
        if from.0 < self.vertex_count && to.0 < self.vertex_count {
            Some(from.0 * self.vertex_count + to.0)
        } else {
            None
        }
    }
}

/// Ordered edges of a route and their total weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    pub total_weight: f64,
    pub edges: Vec<EdgeID>,
}

/// All-pairs shortest paths over a frozen graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Router {
    graph: Graph,
    table: RoutesTable,
}

impl Router {
    /// Computes the routes table with a Floyd–Warshall relaxation.
    pub fn build(graph: Graph) -> Router {
        let before = SystemTime::now();
        let table = relax(&graph);

        if let Ok(elapsed) = before.elapsed() {
            info!(
                "Routes table computed for {} vertices in {}ms",
                graph.vertex_count(),
                elapsed.as_millis()
            );
        }

        Router { graph, table }
    }

    /// Wraps a previously computed table, checking that it is consistent with `graph`.
    pub fn restore(graph: Graph, table: RoutesTable) -> Result<Router, RestoreError> {
        validate_table(&graph, &table)?;
        Ok(Router { graph, table })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn table(&self) -> &RoutesTable {
        &self.table
    }

    pub fn find_route(&self, from: VertexID, to: VertexID) -> Option<RoutePath> {
        let total_weight = self.table.get(from, to)?.weight;

        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            if edges.len() >= self.graph.vertex_count() {
                error!("Route {from} -> {to} does not lead back to its origin");
                return None;
            }
            let edge_id = self.table.get(from, current)?.prev_edge?;
            let edge = self.graph.get_edge(edge_id)?;
            edges.push(edge_id);
            current = edge.from;
        }
        edges.reverse();

        Some(RoutePath {
            total_weight,
            edges,
        })
    }
}

fn relax(graph: &Graph) -> RoutesTable {
    let n = graph.vertex_count();
    let mut table = RoutesTable::new(n);

    for from in (0..n).map(VertexID) {
        for (id, edge) in graph.edges_from(from) {
            if edge.to == from {
                continue;
            }
            let improves = table
                .get(from, edge.to)
                .is_none_or(|current| edge.weight < current.weight);
            if improves {
                table.set(
                    from,
                    edge.to,
                    RouteEntry {
                        weight: edge.weight,
                        prev_edge: Some(id),
                    },
                );
            }
        }
    }

    for k in (0..n).map(VertexID) {
        for i in (0..n).map(VertexID) {
            let Some(&through) = table.get(i, k) else {
                continue;
            };
            for j in (0..n).map(VertexID) {
                if j == i {
                    continue;
                }
                let Some(&tail) = table.get(k, j) else {
                    continue;
                };
                let weight = through.weight + tail.weight;
                if table.get(i, j).is_none_or(|current| weight < current.weight) {
                    table.set(
                        i,
                        j,
                        RouteEntry {
                            weight,
                            prev_edge: tail.prev_edge,
                        },
                    );
                }
            }
        }
    }

    table
}

fn validate_table(graph: &Graph, table: &RoutesTable) -> Result<(), RestoreError> {
    if table.vertex_count() != graph.vertex_count() {
        return Err(RestoreError::DimensionMismatch {
            expected: graph.vertex_count(),
            found: table.vertex_count(),
        });
    }

    for (i, row) in table.rows().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            let Some(entry) = cell else {
                continue;
            };
            let (from, to) = (VertexID(i), VertexID(j));

            if from == to {
                return Err(RestoreError::DiagonalEntry(from));
            }
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(RestoreError::InvalidWeight {
                    from,
                    to,
                    weight: entry.weight,
                });
            }
            let edge_id = entry
                .prev_edge
                .ok_or(RestoreError::MissingPrevEdge { from, to })?;
            let edge = graph
                .get_edge(edge_id)
                .ok_or(RestoreError::EdgeOutOfRange {
                    from,
                    to,
                    edge: edge_id,
                })?;
            if edge.to != to {
                return Err(RestoreError::PrevEdgeMismatch {
                    from,
                    to,
                    edge: edge_id,
                });
            }
        }
    }

    Ok(())
}
