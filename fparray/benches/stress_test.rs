use fparray::fp::{build_pass, count_pass, finalize_building, finalize_counts, matrix_to_transactions, mine_patterns};
use fparray::{Database, MinSupport, Miner, MinerConfig, MiningResult, StreamingState};
use ndarray::Array2;
use rand::Rng;
use std::time::Instant;

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

fn miner(min_support: f64, groups: usize) -> Miner {
    Miner::new(MinerConfig::new(MinSupport::Fraction(min_support)).with_groups(groups)).unwrap()
}

fn report(result: &MiningResult) {
    let levels = result.levels();
    println!("  Patterns: {}", result.len());
    println!("  Max itemset size: {}", levels.len());
    println!("  Rounds: {}", result.rounds);
    println!(
        "  Cache: {} hits / {} misses ({:.1}% hit ratio)",
        result.cache_stats.hits,
        result.cache_stats.misses,
        result.cache_stats.hit_ratio() * 100.0
    );
}

fn stress_test_scaling() {
    println!("\n=== Scaling Test ===");

    let configs = vec![
        ("10K x 50", 10_000, 50, 15),
        ("50K x 80", 50_000, 80, 20),
        ("100K x 100", 100_000, 100, 25),
    ];

    for (name, num_tx, num_items, avg_size) in configs {
        println!("\nTesting: {}", name);
        let start_gen = Instant::now();
        let mut db = Database::from_dense(generate_transactions(num_tx, num_items, avg_size, 0.7).view());
        println!("  Generated in {:?}", start_gen.elapsed());

        let start = Instant::now();
        match miner(0.01, 4).mine(&mut db) {
            Ok(result) => {
                println!("  ✓ Completed in {:?}", start.elapsed());
                report(&result);
            }
            Err(err) => println!("  ✗ Failed: {err}"),
        }
    }
}

fn stress_test_streaming_vs_in_memory() {
    println!("\n=== Streaming vs In-Memory Comparison ===");

    let num_tx = 50_000;
    let transactions = generate_transactions(num_tx, 100, 20, 0.7);
    let min_support = 0.01;
    let miner = miner(min_support, 2);

    println!("  In-memory:");
    let start = Instant::now();
    let mut db = Database::from_dense(transactions.view());
    let in_memory = miner.mine(&mut db).unwrap();
    let in_memory_time = start.elapsed();
    println!("    Time: {:?}", in_memory_time);
    println!("    Patterns: {}", in_memory.len());

    println!("  Streaming (chunked):");
    let start = Instant::now();
    let mut state = StreamingState::new();
    let chunk_size = 5000;
    let chunks: Vec<Vec<Vec<u32>>> = (0..num_tx)
        .step_by(chunk_size)
        .map(|start_idx| {
            let end_idx = (start_idx + chunk_size).min(num_tx);
            matrix_to_transactions(transactions.slice(ndarray::s![start_idx..end_idx, ..]))
        })
        .collect();

    for chunk in &chunks {
        count_pass(&mut state, chunk).unwrap();
    }
    finalize_counts(&mut state, MinSupport::Fraction(min_support)).unwrap();
    for chunk in &chunks {
        build_pass(&mut state, chunk).unwrap();
    }
    finalize_building(&mut state).unwrap();
    let streamed = mine_patterns(&state, &miner).unwrap();
    let streamed_time = start.elapsed();

    println!("    Time: {:?}", streamed_time);
    println!("    Patterns: {}", streamed.len());

    let overhead = (streamed_time.as_secs_f64() / in_memory_time.as_secs_f64() - 1.0) * 100.0;
    println!("    Overhead: {:.1}%", overhead);
}

fn stress_test_extreme_low_support() {
    println!("\n=== Extreme Low Support Test ===");

    let db = Database::from_dense(generate_transactions(20_000, 100, 20, 0.6).view());

    for min_support in [0.05, 0.02, 0.01, 0.005] {
        println!("\nTesting min_support = {}", min_support);
        let start = Instant::now();
        let mut db = db.clone();
        match miner(min_support, 4).mine(&mut db) {
            Ok(result) => {
                println!("  Time: {:?}", start.elapsed());
                report(&result);
                if result.len() > 1_000_000 {
                    println!("  ⚠ Pattern explosion detected!");
                }
            }
            Err(err) => println!("  ✗ Failed: {err}"),
        }
    }
}

fn stress_test_dense_data() {
    println!("\n=== Dense Data Test (worst case) ===");

    let configs = vec![
        ("Dense 80%", 10_000, 50, 40, 0.8),
        ("Dense 90%", 10_000, 50, 45, 0.9),
    ];

    for (name, num_tx, num_items, avg_size, density) in configs {
        println!("\nTesting: {}", name);
        let mut db = Database::from_dense(generate_transactions(num_tx, num_items, avg_size, density).view());

        let start = Instant::now();
        match miner(0.3, 4).mine(&mut db) {
            Ok(result) => {
                println!("  Time: {:?}", start.elapsed());
                report(&result);
            }
            Err(err) => println!("  ✗ Failed: {err}"),
        }
    }
}

fn main() {
    println!("=== fparray Stress Testing Suite ===");

    stress_test_scaling();
    stress_test_streaming_vs_in_memory();
    stress_test_extreme_low_support();
    stress_test_dense_data();

    println!("\n=== Stress Testing Complete ===");
}
