use log::info;
use rstar::{RTree, primitives::GeomWithData};

use crate::{Coordinate, NodeId};

type IndexedNode = GeomWithData<[f64; 3], NodeId>;

/// R-tree over node positions, keyed on unit-sphere vectors.
///
/// Chord length grows with great-circle distance, so the nearest neighbour
/// in the tree is the geodesically nearest node.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    r_tree: RTree<IndexedNode>,
}

fn key(coordinate: &Coordinate) -> [f64; 3] {
    let lat = coordinate.lat().to_radians();
    let lng = coordinate.lng().to_radians();

    [lat.cos() * lng.cos(), lat.cos() * lng.sin(), lat.sin()]
}

impl SpatialIndex {
    pub fn bulk_load<'a>(nodes: impl Iterator<Item = (&'a NodeId, &'a Coordinate)>) -> Self {
        let r_tree = RTree::bulk_load(
            nodes
                .map(|(id, coordinate)| GeomWithData::new(key(coordinate), id.clone()))
                .collect(),
        );

        info!("Created r-tree: {} elements", r_tree.size());

        Self { r_tree }
    }

    pub fn insert(&mut self, id: NodeId, coordinate: &Coordinate) {
        self.r_tree.insert(GeomWithData::new(key(coordinate), id));
    }

    pub fn remove(&mut self, id: &str, coordinate: &Coordinate) -> bool {
        self.r_tree
            .remove(&GeomWithData::new(key(coordinate), id.to_string()))
            .is_some()
    }

    pub fn size(&self) -> usize {
        self.r_tree.size()
    }

    pub fn nearest(&self, coordinate: &Coordinate) -> Option<&str> {
        self.r_tree
            .nearest_neighbor(&key(coordinate))
            .map(|n| n.data.as_str())
    }
}
