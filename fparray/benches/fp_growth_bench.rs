use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fparray::{CacheGeometry, Database, MinSupport, Miner, MinerConfig};
use ndarray::Array2;
use rand::Rng;

/// Generate synthetic transaction data
///
/// Parameters:
/// - num_transactions: Number of transactions
/// - num_items: Total number of possible items
/// - avg_transaction_size: Average items per transaction
/// - density: How dense the data is (0.0-1.0)
fn generate_transactions(
    num_transactions: usize,
    num_items: usize,
    avg_transaction_size: usize,
    density: f64,
) -> Array2<i32> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0i32; num_transactions * num_items];

    for tx_idx in 0..num_transactions {
        let random_factor: f64 = rng.r#gen();
        let num_items_in_tx = (avg_transaction_size as f64 * (0.5 + random_factor)).round() as usize;
        let num_items_in_tx = num_items_in_tx.min(num_items);

        for _ in 0..num_items_in_tx {
            let density_check: f64 = rng.r#gen();
            if density_check < density {
                let item = rng.gen_range(0..num_items);
                data[tx_idx * num_items + item] = 1;
            }
        }
    }

    Array2::from_shape_vec((num_transactions, num_items), data).unwrap()
}

fn run(db: &Database, miner: &Miner) -> usize {
    let mut db = db.clone();
    miner.mine(&mut db).map(|result| result.len()).unwrap_or(0)
}

/// Mining time as the dataset grows
fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("fparray_scaling");
    let miner = Miner::new(MinerConfig::new(MinSupport::Fraction(0.1)).with_groups(2)).unwrap();

    let configs = vec![
        ("small_100tx", 100, 20, 5),
        ("medium_500tx", 500, 50, 10),
        ("large_1000tx", 1000, 100, 15),
        ("xlarge_5000tx", 5000, 100, 20),
    ];

    for (name, num_tx, num_items, avg_size) in configs {
        let db = Database::from_dense(generate_transactions(num_tx, num_items, avg_size, 0.7).view());

        group.bench_with_input(BenchmarkId::from_parameter(name), &db, |b, db| {
            b.iter(|| run(black_box(db), &miner));
        });
    }

    group.finish();
}

/// Mining time across support thresholds
fn bench_min_support(c: &mut Criterion) {
    let mut group = c.benchmark_group("fparray_min_support");
    let db = Database::from_dense(generate_transactions(1000, 50, 10, 0.7).view());

    for min_sup in [0.05, 0.1, 0.2, 0.3, 0.5] {
        let miner = Miner::new(MinerConfig::new(MinSupport::Fraction(min_sup))).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:.2}", min_sup)),
            &miner,
            |b, miner| {
                b.iter(|| run(black_box(&db), miner));
            },
        );
    }

    group.finish();
}

/// Same work split over different group / thread layouts
fn bench_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("fparray_layouts");
    let db = Database::from_dense(generate_transactions(2000, 60, 12, 0.7).view());

    let layouts = vec![("1x1", 1, 1), ("1x4", 1, 4), ("2x2", 2, 2), ("4x1", 4, 1), ("4x2", 4, 2)];

    for (name, groups, threads) in layouts {
        let miner = Miner::new(
            MinerConfig::new(MinSupport::Fraction(0.05))
                .with_groups(groups)
                .with_threads_per_group(threads),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &miner, |b, miner| {
            b.iter(|| run(black_box(&db), miner));
        });
    }

    group.finish();
}

/// Cost of the array read cache at different geometries
fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("fparray_cache");
    let db = Database::from_dense(generate_transactions(2000, 40, 15, 0.9).view());
    let base = MinerConfig::new(MinSupport::Fraction(0.1)).with_groups(2);

    let configs = vec![
        ("uncached", base.clone().without_cache()),
        ("2way_64", base.clone().with_cache(CacheGeometry::new(2, 64))),
        ("2way_1024", base.clone().with_cache(CacheGeometry::new(2, 1024))),
        ("8way_256", base.with_cache(CacheGeometry::new(8, 256))),
    ];

    for (name, config) in configs {
        let miner = Miner::new(config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &miner, |b, miner| {
            b.iter(|| run(black_box(&db), miner));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scaling, bench_min_support, bench_layouts, bench_cache);
criterion_main!(benches);
