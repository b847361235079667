use std::fmt::Display;

use crate::structures::BusID;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexID(pub usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeID(pub usize);

/// Directed weighted edge. The weight is a travel time in minutes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Edge {
    pub from: VertexID,
    pub to: VertexID,
    pub weight: f64,
}

/// Presentation data of a transit edge, kept outside the graph and indexed by [`EdgeID`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub bus: BusID,
    pub span_count: usize,
}

impl Display for VertexID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for EdgeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
