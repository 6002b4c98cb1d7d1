use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waypoint_graph::core::GraphFormat;
use waypoint_graph::graph::{find_path, nearest};
use waypoint_graph::storage::{codec_for, decode_any};
use waypoint_graph::{GraphStore, NodeId, Point};

/// Square grid with 4-neighbour connections, ids in row-major order
fn grid(side: usize) -> (GraphStore, Vec<NodeId>) {
    let mut g = GraphStore::new();
    let mut ids = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            ids.push(g.add_node(Point::new(col as f64 * 10.0, row as f64 * 10.0)).unwrap());
        }
    }
    for row in 0..side {
        for col in 0..side {
            let here = ids[row * side + col];
            if col + 1 < side {
                g.add_edge(here, ids[row * side + col + 1]).unwrap();
            }
            if row + 1 < side {
                g.add_edge(here, ids[(row + 1) * side + col]).unwrap();
            }
        }
    }
    (g, ids)
}

fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_grid");
    for side in [10, 30, 60] {
        let (g, ids) = grid(side);
        let (start, goal) = (ids[0], ids[ids.len() - 1]);
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| find_path(black_box(&g), start, goal).unwrap())
        });
    }
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let (g, _) = grid(60);
    c.bench_function("nearest_3600", |b| {
        b.iter(|| nearest(black_box(&g), black_box(Point::new(297.0, 301.0))).unwrap())
    });
}

fn bench_codec(c: &mut Criterion) {
    let (g, _) = grid(30);
    let mut group = c.benchmark_group("codec_round_trip");
    for format in [GraphFormat::Binary, GraphFormat::Json] {
        let codec = codec_for(format, u64::MAX);
        group.bench_function(format!("{:?}", format), |b| {
            b.iter(|| {
                let bytes = codec.encode(black_box(&g)).unwrap();
                decode_any(&bytes, u64::MAX).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_astar, bench_nearest, bench_codec);
criterion_main!(benches);
