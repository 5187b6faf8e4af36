use std::cmp::Reverse;

use log::{debug, trace};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::{
    GraphError, NodeId,
    graph::{GeoGraph, PathResult},
};

/// Heap priority: the cheapest node first, the smallest id among equal costs.
type Priority<'a> = Reverse<(OrderedFloat<f64>, &'a str)>;

pub trait Dijkstra {
    /// Settles nodes from `start` until `target` is settled or every
    /// reachable node is.
    fn dijkstra(&self, start: &str, target: Option<&str>) -> Result<DijkstraResult, GraphError>;

    /// Cheapest route from `start` to `end`.
    ///
    /// An unreachable `end` yields an empty [`PathResult`], not an error.
    fn shortest_path(&self, start: &str, end: &str) -> Result<PathResult, GraphError>;

    /// Distances and predecessors of every node reachable from `start`.
    fn distances_from(&self, start: &str) -> Result<DijkstraResult, GraphError> {
        self.dijkstra(start, None)
    }
}

impl Dijkstra for GeoGraph {
    fn dijkstra(&self, start: &str, target: Option<&str>) -> Result<DijkstraResult, GraphError> {
        if !self.contains(start) {
            return Err(GraphError::UnknownNode(start.to_string()));
        }

        let mut frontier: PriorityQueue<&str, Priority<'_>, FxBuildHasher> =
            PriorityQueue::with_hasher(FxBuildHasher);
        let mut tentative: FxHashMap<&str, ResultNode> = FxHashMap::default();
        let mut settled = FxHashMap::default();
        let mut visited = FxHashSet::default();

        frontier.push(start, Reverse((OrderedFloat(0.0), start)));
        tentative.insert(start, ResultNode::new(0.0, None));

        while let Some((node, _)) = frontier.pop() {
            visited.insert(node);
            let Some(current) = tentative.remove(node) else {
                continue;
            };
            let cost = current.cost();
            settled.insert(node.to_string(), current);

            if target == Some(node) {
                trace!("found path to node '{}'", node);
                break;
            }

            for edge in self.neighbors(node) {
                let next = edge.target();
                if visited.contains(next) {
                    continue;
                }

                let path_cost = cost + edge.weight();
                let improves = tentative
                    .get(next)
                    .is_none_or(|known| path_cost < known.cost());
                if improves {
                    tentative.insert(next, ResultNode::new(path_cost, Some(node.to_string())));
                    frontier.push_increase(next, Reverse((OrderedFloat(path_cost), next)));
                }
            }
        }

        if let Some(target) = target.filter(|t| !settled.contains_key(*t)) {
            debug!("could not find a path from '{}' to '{}'", start, target);
        }

        Ok(DijkstraResult::new(start.to_string(), settled))
    }

    fn shortest_path(&self, start: &str, end: &str) -> Result<PathResult, GraphError> {
        if !self.contains(end) {
            return Err(GraphError::UnknownNode(end.to_string()));
        }

        Ok(self.dijkstra(start, Some(end))?.path(end))
    }
}

/// Settled nodes of a Dijkstra run.
#[derive(Debug, Clone, PartialEq)]
pub struct DijkstraResult {
    start: NodeId,
    nodes: FxHashMap<NodeId, ResultNode>,
}

impl DijkstraResult {
    pub fn new(start: NodeId, nodes: FxHashMap<NodeId, ResultNode>) -> Self {
        Self { start, nodes }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn get(&self, id: &str) -> Option<&ResultNode> {
        self.nodes.get(id)
    }

    pub fn cost(&self, id: &str) -> Option<f64> {
        self.get(id).map(ResultNode::cost)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultNode)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Walks the predecessors back from `target`.
    pub fn path(&self, target: &str) -> PathResult {
        let Some(end) = self.get(target) else {
            return PathResult::no_route();
        };

        let mut path = vec![target.to_string()];
        let mut prev = end.prev_node_id();
        while let Some(node_id) = prev {
            path.push(node_id.to_string());
            prev = self.get(node_id).and_then(ResultNode::prev_node_id);
        }
        path.reverse();

        PathResult::new(path, end.cost())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultNode {
    cost: f64,
    prev_node_id: Option<NodeId>,
}

impl ResultNode {
    pub fn new(cost: f64, prev_node_id: Option<NodeId>) -> Self {
        Self { cost, prev_node_id }
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn prev_node_id(&self) -> Option<&str> {
        self.prev_node_id.as_deref()
    }
}
