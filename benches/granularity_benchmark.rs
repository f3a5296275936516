use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridlock::{execute, Granularity, Grid, LockFabric, Pos, RunConfig, SwapEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;

/// Full workload: spawn, swap, drain. Dominated by lock contention once the
/// thread count exceeds the core count.
fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    group.sample_size(10);

    for granularity in Granularity::ALL {
        group.bench_function(granularity.to_string(), |b| {
            let mut config = RunConfig::new(8, 16, granularity);
            config.seed = Some(1234);
            b.iter(|| {
                let report = execute(&config).unwrap();
                black_box(report.final_sum);
            });
        });
    }

    group.finish();
}

/// Two workers hammering swaps on a small grid: isolates per-swap lock
/// overhead and contention without the spawn cost of a full run.
fn bench_contended_swaps(c: &mut Criterion) {
    const SWAPS: usize = 1_000;

    let mut group = c.benchmark_group("contended_swaps");

    for granularity in [Granularity::Grid, Granularity::Row, Granularity::Cell] {
        group.bench_function(granularity.to_string(), |b| {
            let mut rng = StdRng::seed_from_u64(42);
            let grid = Grid::random(4, &mut rng);
            let fabric = LockFabric::new();

            b.iter(|| {
                let grid = &grid;
                let fabric = &fabric;
                thread::scope(|s| {
                    for worker in 0..2u64 {
                        s.spawn(move || {
                            let engine = SwapEngine::new(grid, fabric, granularity, None);
                            let mut rng = StdRng::seed_from_u64(worker);
                            for _ in 0..SWAPS {
                                let a = Pos::new(rng.gen_range(0..4), rng.gen_range(0..4));
                                let b = Pos::new(rng.gen_range(0..4), rng.gen_range(0..4));
                                engine.swap_once(a, b);
                            }
                        });
                    }
                });
                black_box(grid.checksum());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_full_run, bench_contended_swaps);
criterion_main!(benches);
