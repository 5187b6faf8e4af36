use std::{error::Error, fmt::Display, sync::Arc};

use parking_lot::RwLock;

pub mod algorithms;
pub mod geo_types;
pub mod graph;
pub mod oracle;
pub mod snapshot;
pub mod types;

pub use algorithms::dijkstra::Dijkstra;
pub use crate::geo_types::distance;
pub use graph::{Edge, GeoGraph, PathResult};
pub use types::{Coordinate, NodeId};

/// A graph shared between threads: concurrent queries, exclusive mutation.
pub type SharedGraph = Arc<RwLock<GeoGraph>>;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    DuplicateNode(NodeId),
    UnknownNode(NodeId),
    MalformedGraph(String),
    InvalidNodeId,
    InvalidCoordinate(f64, f64),
}

impl Error for GraphError {}

impl Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode(node) => write!(f, "node_id: '{}' already exists in graph", node),
            Self::UnknownNode(node) => write!(f, "node_id: '{}' not found in graph", node),
            Self::MalformedGraph(reason) => write!(f, "malformed graph: {}", reason),
            Self::InvalidNodeId => write!(f, "node_id must not be empty"),
            Self::InvalidCoordinate(lat, lng) => {
                write!(f, "coordinate ({}, {}) is out of range", lat, lng)
            }
        }
    }
}

pub fn shared(graph: GeoGraph) -> SharedGraph {
    Arc::new(RwLock::new(graph))
}
