use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::{Coordinate, GraphError, NodeId, geo_types::distance, graph::Edge};

use super::rstar::SpatialIndex;

/// Weighted, logically undirected graph over named, geolocated nodes.
///
/// Every undirected edge is stored as two mirrored [`Edge`] records keyed by
/// their source node. Weights must be non-negative; this is not checked.
#[derive(Debug, Default)]
pub struct GeoGraph {
    nodes: Vec<NodeId>,
    coordinates: FxHashMap<NodeId, Coordinate>,
    adjacency: FxHashMap<NodeId, Vec<Edge>>,
    spatial: SpatialIndex,
}

impl GeoGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a graph from parts that already satisfy the node invariants.
    pub(crate) fn from_parts(
        nodes: Vec<NodeId>,
        coordinates: FxHashMap<NodeId, Coordinate>,
        adjacency: FxHashMap<NodeId, Vec<Edge>>,
    ) -> Self {
        let spatial = SpatialIndex::bulk_load(coordinates.iter());
        Self {
            nodes,
            coordinates,
            adjacency,
            spatial,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edge records.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.coordinates.contains_key(id)
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn coordinate(&self, id: &str) -> Option<&Coordinate> {
        self.coordinates.get(id)
    }

    pub fn neighbors(&self, id: &str) -> &[Edge] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.neighbors(id).len()
    }

    /// Weight of the directed record `a -> b`, if present.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        self.neighbors(a)
            .iter()
            .find(|e| e.target() == b)
            .map(Edge::weight)
    }

    pub fn add_node(&mut self, id: impl Into<NodeId>, coordinate: Coordinate) -> Result<(), GraphError> {
        let id = id.into();
        if id.is_empty() {
            return Err(GraphError::InvalidNodeId);
        }
        if !coordinate.is_valid() {
            return Err(GraphError::InvalidCoordinate(coordinate.lat(), coordinate.lng()));
        }
        if self.contains(&id) {
            return Err(GraphError::DuplicateNode(id));
        }

        trace!("adding node '{}' at {:?}", id, coordinate);
        self.spatial.insert(id.clone(), &coordinate);
        self.coordinates.insert(id.clone(), coordinate);
        self.adjacency.insert(id.clone(), Vec::new());
        self.nodes.push(id);

        Ok(())
    }

    /// Removes `id` together with every edge touching it, returning its
    /// coordinate.
    pub fn remove_node(&mut self, id: &str) -> Result<Coordinate, GraphError> {
        let coordinate = self
            .coordinates
            .remove(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;

        self.adjacency.remove(id);
        self.nodes.retain(|n| n != id);
        self.spatial.remove(id, &coordinate);

        let mut removed = 0;
        self.adjacency.values_mut().for_each(|edges| {
            let before = edges.len();
            edges.retain(|e| e.target() != id);
            removed += before - edges.len();
        });

        debug!("removed node '{}' and {} incoming edges", id, removed);

        Ok(coordinate)
    }

    /// Connects `a` and `b` in both directions.
    ///
    /// Without a `weight` the haversine distance between both nodes is used.
    /// A direction that already has an edge (of any weight) is left untouched.
    /// Returns the number of directed records inserted.
    pub fn add_undirected_edge(
        &mut self,
        a: &str,
        b: &str,
        weight: Option<f64>,
    ) -> Result<usize, GraphError> {
        let coord_a = self.known(a)?;
        let coord_b = self.known(b)?;
        let weight = weight.unwrap_or_else(|| distance(coord_a, coord_b));

        let inserted = usize::from(self.insert_directed(a, b, weight))
            + usize::from(self.insert_directed(b, a, weight));

        trace!("edge '{}' <-> '{}' ({}): {} records added", a, b, weight, inserted);

        Ok(inserted)
    }

    /// Removes both directions between `a` and `b`, returning the removed
    /// weight (`a -> b` preferred).
    pub fn remove_undirected_edge(&mut self, a: &str, b: &str) -> Result<Option<f64>, GraphError> {
        self.known(a)?;
        self.known(b)?;

        let forward = self.remove_directed(a, b);
        let backward = self.remove_directed(b, a);

        Ok(forward.or(backward))
    }

    /// Adds the missing reverse record for every stored edge.
    ///
    /// A reverse record counts as present when any edge to the source exists,
    /// regardless of its weight. Returns the number of records inserted.
    pub fn normalize_undirected(&mut self) -> usize {
        let forward: Vec<(NodeId, NodeId, f64)> = self
            .nodes
            .iter()
            .flat_map(|u| {
                self.neighbors(u)
                    .iter()
                    .map(move |e| (u.clone(), e.target().to_string(), e.weight()))
            })
            .collect();

        let mut inserted = 0;
        for (u, v, w) in forward {
            if self.insert_directed(&v, &u, w) {
                inserted += 1;
            }
        }

        debug!("normalized graph: {} reverse edges added", inserted);

        inserted
    }

    /// Nearest node to `coordinate`, `None` for an empty graph.
    pub fn nearest_node(&self, coordinate: &Coordinate) -> Option<&str> {
        self.spatial.nearest(coordinate)
    }

    /// Nearest node no further than `max_meters` from `coordinate`.
    pub fn nearest_node_within(&self, coordinate: &Coordinate, max_meters: f64) -> Option<&str> {
        let id = self.spatial.nearest(coordinate)?;
        let nearest = self.coordinates.get(id)?;

        (distance(coordinate, nearest) <= max_meters).then_some(id)
    }

    pub(crate) fn coordinates(&self) -> &FxHashMap<NodeId, Coordinate> {
        &self.coordinates
    }

    fn known(&self, id: &str) -> Result<&Coordinate, GraphError> {
        self.coordinates
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    fn insert_directed(&mut self, a: &str, b: &str, weight: f64) -> bool {
        let Some(edges) = self.adjacency.get_mut(a) else {
            return false;
        };
        if edges.iter().any(|e| e.target() == b) {
            return false;
        }
        edges.push(Edge::new(b, weight));

        true
    }

    fn remove_directed(&mut self, a: &str, b: &str) -> Option<f64> {
        let edges = self.adjacency.get_mut(a)?;
        let index = edges.iter().position(|e| e.target() == b)?;

        Some(edges.remove(index).weight())
    }
}

impl PartialEq for GeoGraph {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.coordinates == other.coordinates
            && self.adjacency == other.adjacency
    }
}
