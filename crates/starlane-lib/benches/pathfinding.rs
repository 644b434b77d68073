use criterion::{criterion_group, criterion_main, Criterion};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starlane_lib::{
    build_graph, k_shortest_paths, BruteForceTransits, DatasetId, DistanceBounds, FindOptions,
    KdTreeTransits, RouteFinder, RouteFindingOptions, RouteGraph, StarNode, StarPosition,
    TransitCalculator,
};
use std::hint::black_box;

const STAR_COUNT: usize = 1_200;
const EXTENT: f64 = 120.0;

static STARS: Lazy<Vec<StarNode>> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    (0..STAR_COUNT)
        .map(|index| {
            StarNode::new(
                index as i64,
                format!("S{index:04}"),
                StarPosition::new(
                    rng.gen_range(0.0..EXTENT),
                    rng.gen_range(0.0..EXTENT),
                    rng.gen_range(0.0..EXTENT),
                ),
            )
        })
        .collect()
});
static BOUNDS: Lazy<DistanceBounds> =
    Lazy::new(|| DistanceBounds::new(0.0, 14.0).expect("valid bounds"));
static GRAPH: Lazy<RouteGraph> = Lazy::new(|| {
    let stars: Vec<&StarNode> = STARS.iter().collect();
    let edges = KdTreeTransits
        .calculate(&stars, *BOUNDS)
        .expect("finite positions");
    build_graph(&edges).expect("within capacity")
});

fn endpoints() -> (String, String) {
    (STARS[0].name.clone(), STARS[STAR_COUNT - 1].name.clone())
}

fn benchmark_pathfinding(c: &mut Criterion) {
    let stars: Vec<&StarNode> = STARS.iter().collect();

    c.bench_function("transits_brute_force_1200", |b| {
        b.iter(|| {
            let edges = BruteForceTransits.calculate(&stars, *BOUNDS).expect("edges");
            black_box(edges.len())
        });
    });

    c.bench_function("transits_kd_tree_1200", |b| {
        b.iter(|| {
            let edges = KdTreeTransits.calculate(&stars, *BOUNDS).expect("edges");
            black_box(edges.len())
        });
    });

    c.bench_function("yen_k5_1200", |b| {
        let graph = &*GRAPH;
        let (origin, destination) = endpoints();
        b.iter(|| {
            let paths = k_shortest_paths(graph, &origin, &destination, 5);
            black_box(paths.len())
        });
    });

    c.bench_function("find_routes_uncached_1200", |b| {
        let finder = RouteFinder::default();
        let (origin, destination) = endpoints();
        let options = RouteFindingOptions::new(origin, destination, 0.0, 14.0, 5);
        let dataset = DatasetId::new("bench");
        let find = FindOptions::uncached();
        b.iter(|| {
            let result = finder.find_routes_with(&options, &STARS, &dataset, &find);
            black_box(result.is_success())
        });
    });
}

criterion_group!(benches, benchmark_pathfinding);
criterion_main!(benches);
