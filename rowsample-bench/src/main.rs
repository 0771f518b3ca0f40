//! Benchmark runner for sampling sessions

use rowsample_bench::{bench_reservoir_offer, bench_session_end_to_end, BenchConfig, BenchResult};

fn print_result(result: &BenchResult) {
    println!("\nBenchmark: {}", result.name);
    println!("  Total time:   {:?}", result.total_time);
    println!("  Average time: {:?}", result.avg_time);
    println!("  Min time:     {:?}", result.min_time);
    println!("  Max time:     {:?}", result.max_time);
    println!("  Throughput:   {:.2} rows/sec", result.throughput);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Row Sampling Benchmarks ===");

    let config = BenchConfig::default();
    print_result(&bench_reservoir_offer(&config)?);
    print_result(&bench_session_end_to_end(&config)?);

    println!("\n=== Sample Size Sweep ===");

    for sample_size in [0, 100, 1000, 5000, 50_000] {
        let config = BenchConfig {
            iterations: 3,
            warmup_iterations: 1,
            sample_size,
            ..BenchConfig::default()
        };

        let result = bench_session_end_to_end(&config)?;
        println!("\nSample size: {}", sample_size);
        println!("  Average time: {:?}", result.avg_time);
        println!("  Throughput:   {:.2} rows/sec", result.throughput);
    }

    Ok(())
}
