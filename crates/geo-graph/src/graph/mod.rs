use serde::{Deserialize, Serialize};

use crate::NodeId;

pub mod adjacency;
pub mod rstar;

pub use adjacency::GeoGraph;

/// Directed adjacency record. An undirected edge is stored as two of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "node")]
    target: NodeId,
    weight: f64,
}

impl Edge {
    pub fn new(target: impl Into<NodeId>, weight: f64) -> Edge {
        Self {
            target: target.into(),
            weight,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Outcome of a shortest-path query.
///
/// An empty `path` means there is no route; `total_weight` is `0.0` in that
/// case and must not be read as a zero-length route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub path: Vec<NodeId>,
    pub total_weight: f64,
}

impl PathResult {
    pub fn new(path: Vec<NodeId>, total_weight: f64) -> Self {
        Self { path, total_weight }
    }

    pub fn no_route() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn start(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    pub fn end(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }
}
