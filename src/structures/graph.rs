use thiserror::Error;

use crate::structures::{Edge, EdgeID, VertexID};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("vertex {0} is out of range")]
    VertexNotFound(VertexID),
    #[error("edge {0} has an invalid weight {1}")]
    InvalidWeight(EdgeID, f64),
}

/// Append-only directed graph. The vertex set is fixed at construction, edges
/// keep the id they were given on insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    vertex_count: usize,
    edges: Vec<Edge>,
    incidence_lists: Vec<Vec<EdgeID>>,
}

impl Graph {
    pub fn new(vertex_count: usize) -> Graph {
        Graph {
            vertex_count,
            edges: Vec::new(),
            incidence_lists: vec![Vec::new(); vertex_count],
        }
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeID, GraphError> {
        let id = EdgeID(self.edges.len());

        for vertex in [edge.from, edge.to] {
            if vertex.0 >= self.vertex_count {
                return Err(GraphError::VertexNotFound(vertex));
            }
        }
        if !edge.weight.is_finite() || edge.weight < 0.0 {
            return Err(GraphError::InvalidWeight(id, edge.weight));
        }

        self.edges.push(edge);
        self.incidence_lists[edge.from.0].push(id);
        Ok(id)
    }

    pub fn get_edge(&self, id: EdgeID) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Outgoing edges of `vertex`, in insertion order. Empty for unknown vertices.
    pub fn edges_from(&self, vertex: VertexID) -> impl Iterator<Item = (EdgeID, &Edge)> + '_ {
        self.incidence_lists
            .get(vertex.0)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&id| (id, &self.edges[id.0]))
    }
}
