use std::path::PathBuf;

use geo_graph::{Coordinate, GeoGraph, snapshot::read_snapshot};
use rand::{Rng, SeedableRng, rngs::SmallRng};

pub fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join(name)
}

pub fn setup() -> GeoGraph {
    read_snapshot(resource("graph-data.json")).unwrap()
}

pub fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("geo-graph-{}-{}", std::process::id(), name))
}

/// Random graph around Istanbul with geodesic weights.
pub fn random_graph(seed: u64, node_count: usize, edge_count: usize) -> GeoGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut graph = GeoGraph::new();

    for i in 0..node_count {
        let coordinate = Coordinate::new(
            rng.random_range(40.8..41.2),
            rng.random_range(28.6..29.4),
        );
        graph.add_node(format!("n{i}"), coordinate).unwrap();
    }

    for _ in 0..edge_count {
        let a = rng.random_range(0..node_count);
        let b = rng.random_range(0..node_count);
        graph
            .add_undirected_edge(&format!("n{a}"), &format!("n{b}"), None)
            .unwrap();
    }

    graph
}
