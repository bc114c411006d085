use criterion::*;
use geo::{Coordinate, Rect};
use geo_topology::MultiPath;
use rand::{rngs::StdRng, SeedableRng};

#[path = "utils/random.rs"]
mod random;
use random::*;

#[path = "utils/candidates.rs"]
mod candidates;
use candidates::*;

const BBOX: [f64; 2] = [1024., 1024.];
const TOLERANCE: f64 = 1e-3;

fn random_polygons(steps: usize, count: usize) -> Vec<MultiPath> {
    let mut rng = StdRng::seed_from_u64(steps as u64);
    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);
    (0..count)
        .map(|_| {
            let center: Coordinate<f64> = uniform_point(&mut rng, bbox);
            MultiPath::from(&circular_polygon(&mut rng, center, BBOX[0] / 4., steps))
        })
        .collect()
}

fn candidate_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidate pairs");
    for &steps in [64, 512, 4096].iter() {
        let polygons = random_polygons(steps, 2);
        let (red, blue) = (&polygons[0], &polygons[1]);
        assert_eq!(
            count_quad_tree(red, blue, TOLERANCE),
            count_intersector(red, blue, TOLERANCE)
        );

        group.bench_with_input(BenchmarkId::new("quad tree", steps), &steps, |b, _| {
            b.iter(|| black_box(count_quad_tree(red, blue, TOLERANCE)))
        });
        group.bench_with_input(BenchmarkId::new("envelope intersector", steps), &steps, |b, _| {
            b.iter(|| black_box(count_intersector(red, blue, TOLERANCE)))
        });
        group.bench_with_input(BenchmarkId::new("rstar", steps), &steps, |b, _| {
            b.iter(|| black_box(count_rtree(red, blue, TOLERANCE)))
        });
    }
    group.finish();
}

criterion_group!(pairs, candidate_pairs);
criterion_main!(pairs);
