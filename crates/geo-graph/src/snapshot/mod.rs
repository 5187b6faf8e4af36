use std::{
    collections::BTreeMap,
    error::Error,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::{debug, info};
use rmp_serde::{Deserializer, Serializer};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, GraphError, NodeId, graph::Edge, graph::GeoGraph};

/// Boundary representation of a graph: node list, coordinates and
/// adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeId>,
    pub coordinates: BTreeMap<NodeId, Coordinate>,
    #[serde(default)]
    pub edges: BTreeMap<NodeId, Vec<Edge>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    MessagePack,
}

impl SnapshotFormat {
    /// `.json` or `.gmp`.
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("gmp") => Ok(Self::MessagePack),
            Some(ext) => Err(format!("file type '.{ext}' not supported").into()),
            None => Err(format!("'{}' is missing a file extension", path.display()).into()),
        }
    }
}

fn malformed(reason: String) -> GraphError {
    GraphError::MalformedGraph(reason)
}

impl TryFrom<Snapshot> for GeoGraph {
    type Error = GraphError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let Snapshot {
            nodes,
            mut coordinates,
            edges,
        } = snapshot;

        let mut seen = FxHashSet::default();
        let mut node_coordinates = FxHashMap::default();
        for id in nodes.iter() {
            if id.is_empty() {
                return Err(malformed("empty node id".to_string()));
            }
            if !seen.insert(id.as_str()) {
                return Err(malformed(format!("node '{id}' is listed twice")));
            }
            let coordinate = coordinates
                .remove(id)
                .ok_or_else(|| malformed(format!("node '{id}' has no coordinate")))?;
            if !coordinate.is_valid() {
                return Err(malformed(format!(
                    "node '{id}' has out of range coordinate ({}, {})",
                    coordinate.lat(),
                    coordinate.lng()
                )));
            }
            node_coordinates.insert(id.clone(), coordinate);
        }

        if let Some(id) = coordinates.keys().next() {
            return Err(malformed(format!("coordinate for unlisted node '{id}'")));
        }

        let mut adjacency: FxHashMap<NodeId, Vec<Edge>> =
            nodes.iter().map(|id| (id.clone(), Vec::new())).collect();
        for (source, targets) in edges {
            if let Some(edge) = targets.iter().find(|e| !seen.contains(e.target())) {
                return Err(malformed(format!(
                    "edge '{source}' -> '{}' targets an unlisted node",
                    edge.target()
                )));
            }
            let mut targets_seen = FxHashSet::default();
            if let Some(edge) = targets.iter().find(|e| !targets_seen.insert(e.target())) {
                return Err(malformed(format!(
                    "edge '{source}' -> '{}' is listed twice",
                    edge.target()
                )));
            }
            let Some(entry) = adjacency.get_mut(&source) else {
                return Err(malformed(format!("edges for unlisted node '{source}'")));
            };
            *entry = targets;
        }

        debug!("validated snapshot with {} nodes", nodes.len());

        Ok(GeoGraph::from_parts(nodes, node_coordinates, adjacency))
    }
}

impl From<&GeoGraph> for Snapshot {
    fn from(graph: &GeoGraph) -> Self {
        let coordinates = graph
            .coordinates()
            .iter()
            .map(|(id, c)| (id.clone(), *c))
            .collect();
        let edges = graph
            .nodes()
            .map(|id| (id.to_string(), graph.neighbors(id).to_vec()))
            .collect();

        Snapshot {
            nodes: graph.nodes().map(str::to_string).collect(),
            coordinates,
            edges,
        }
    }
}

pub fn from_reader<R: Read>(reader: R, format: SnapshotFormat) -> Result<GeoGraph, Box<dyn Error>> {
    let snapshot: Snapshot = match format {
        SnapshotFormat::Json => serde_json::from_reader(reader)?,
        SnapshotFormat::MessagePack => Snapshot::deserialize(&mut Deserializer::new(reader))?,
    };

    Ok(GeoGraph::try_from(snapshot)?)
}

pub fn to_writer<W: Write>(
    writer: W,
    graph: &GeoGraph,
    format: SnapshotFormat,
) -> Result<(), Box<dyn Error>> {
    let snapshot = Snapshot::from(graph);
    match format {
        SnapshotFormat::Json => serde_json::to_writer_pretty(writer, &snapshot)?,
        SnapshotFormat::MessagePack => {
            snapshot.serialize(&mut Serializer::new(writer).with_struct_map())?
        }
    }

    Ok(())
}

/// Loads a graph from a `.json` or `.gmp` snapshot file.
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<GeoGraph, Box<dyn Error>> {
    let path = path.as_ref();
    let format = SnapshotFormat::from_path(path)?;

    debug!("Loading graph from '{}'", path.display());
    let graph = from_reader(BufReader::new(File::open(path)?), format)?;
    info!(
        "Loaded graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}

/// Writes `graph` as a `.json` or `.gmp` snapshot file.
pub fn write_snapshot(path: impl AsRef<Path>, graph: &GeoGraph) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    let format = SnapshotFormat::from_path(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(&mut writer, graph, format)?;
    writer.flush()?;
    info!("Wrote graph to '{}'", path.display());

    Ok(())
}
