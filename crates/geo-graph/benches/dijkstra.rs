use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use geo_graph::{Coordinate, Dijkstra, GeoGraph};

/// Street grid of `side * side` nodes, 0.005° apart, with geodesic weights.
fn grid_graph(side: usize) -> GeoGraph {
    let id = |row: usize, col: usize| format!("{row}:{col}");

    let mut graph = GeoGraph::new();
    for row in 0..side {
        for col in 0..side {
            let coordinate = Coordinate::new(41.0 + row as f64 * 0.005, 28.9 + col as f64 * 0.005);
            graph.add_node(id(row, col), coordinate).unwrap();
        }
    }
    for row in 0..side {
        for col in 0..side {
            if col + 1 < side {
                graph
                    .add_undirected_edge(&id(row, col), &id(row, col + 1), None)
                    .unwrap();
            }
            if row + 1 < side {
                graph
                    .add_undirected_edge(&id(row, col), &id(row + 1, col), None)
                    .unwrap();
            }
        }
    }

    graph
}

pub fn shortest_path_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("dijkstra");

    for side in [8, 16, 32] {
        let graph = grid_graph(side);
        let corners = ("0:0".to_string(), format!("{}:{}", side - 1, side - 1));

        group.bench_with_input(
            BenchmarkId::new("shortest_path", side * side),
            &corners,
            |b, (s, t)| b.iter(|| graph.shortest_path(s, t)),
        );
        group.bench_with_input(
            BenchmarkId::new("distances_from", side * side),
            &corners.0,
            |b, s| b.iter(|| graph.distances_from(s)),
        );
    }

    group.finish();
}

criterion_group!(dijkstra, shortest_path_bench);
criterion_main!(dijkstra);
