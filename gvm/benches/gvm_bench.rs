use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gvm::{Clusters, DiscardKeyer, ListKeyer, VectorSpace};

fn random_points(dim: usize, n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            (0..dim)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                    ((state >> 33) as f64) / (u32::MAX as f64) * 255.0
                })
                .collect()
        })
        .collect()
}

fn bench_add(c: &mut Criterion) {
    let space = VectorSpace::new(3).unwrap();
    let points = random_points(3, 4096, 1);

    for capacity in [16, 256] {
        c.bench_function(&format!("gvm_add_3d_cap{capacity}_4096points"), |b| {
            b.iter_with_setup(
                || Clusters::<()>::with_keyer(space, capacity, DiscardKeyer).unwrap(),
                |mut clusters| {
                    for pt in &points {
                        clusters.add(1.0, black_box(pt), None).unwrap();
                    }
                    black_box(clusters.count())
                },
            );
        });
    }
}

fn bench_add_keyed(c: &mut Criterion) {
    let space = VectorSpace::new(3).unwrap();
    let points = random_points(3, 4096, 2);

    c.bench_function("gvm_add_3d_cap64_4096points_listkeyer", |b| {
        b.iter_with_setup(
            || Clusters::with_keyer(space, 64, ListKeyer).unwrap(),
            |mut clusters| {
                for (i, pt) in points.iter().enumerate() {
                    clusters.add(1.0, black_box(pt), Some(vec![i])).unwrap();
                }
                black_box(clusters.count())
            },
        );
    });
}

fn bench_reduce(c: &mut Criterion) {
    let space = VectorSpace::new(3).unwrap();
    let points = random_points(3, 1024, 3);

    c.bench_function("gvm_reduce_3d_cap256_to_8", |b| {
        b.iter_with_setup(
            || {
                let mut clusters = Clusters::<()>::with_keyer(space, 256, DiscardKeyer).unwrap();
                for pt in &points {
                    clusters.add(1.0, pt, None).unwrap();
                }
                clusters
            },
            |mut clusters| {
                clusters.reduce(-1.0, 8).unwrap();
                black_box(clusters.count())
            },
        );
    });
}

criterion_group!(benches, bench_add, bench_add_keyed, bench_reduce);
criterion_main!(benches);
