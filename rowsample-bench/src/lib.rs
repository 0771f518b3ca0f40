//! Benchmarks for sampling sessions

use std::time::{Duration, Instant};

use rowsample_core::{FieldValue, RawRow, ReservoirSampler, RowSchema, SessionConfig, SourceColumn, SourceKind, StreamSession};
use rowsample_readers::{drive, Error, MemoryRowSource, Result};
use tracing::debug;

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Number of iterations
    pub iterations: usize,

    /// Warmup iterations
    pub warmup_iterations: usize,

    /// Rows in the synthetic stream
    pub rows: usize,

    /// Reservoir size
    pub sample_size: usize,

    /// Distinct values in the categorical column
    pub distinct_categories: usize,

    /// Reservoir seed
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup_iterations: 3,
            rows: 100_000,
            sample_size: 5000,
            distinct_categories: 50,
            seed: 1,
        }
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchResult {
    /// Name of the benchmark
    pub name: String,

    /// Total time taken
    pub total_time: Duration,

    /// Average time per iteration
    pub avg_time: Duration,

    /// Min time per iteration
    pub min_time: Duration,

    /// Max time per iteration
    pub max_time: Duration,

    /// Throughput (rows/second)
    pub throughput: f64,
}

/// Run a benchmark
pub fn run_benchmark<F>(name: &str, config: &BenchConfig, mut func: F) -> Result<BenchResult>
where
    F: FnMut() -> Result<()>,
{
    if config.iterations == 0 {
        return Err(Error::Core(rowsample_core::Error::InvalidArgument(
            "benchmark needs at least one iteration".to_string(),
        )));
    }

    for _ in 0..config.warmup_iterations {
        func()?;
    }

    let mut times = Vec::with_capacity(config.iterations);
    let start_total = Instant::now();

    for _ in 0..config.iterations {
        let start = Instant::now();
        func()?;
        times.push(start.elapsed());
    }

    let total_time = start_total.elapsed();

    let avg_time = times.iter().sum::<Duration>() / u32::try_from(times.len()).unwrap_or(u32::MAX);
    let min_time = times.iter().copied().min().unwrap_or_default();
    let max_time = times.iter().copied().max().unwrap_or_default();

    let total_rows = (config.iterations * config.rows) as f64;
    let throughput = total_rows / total_time.as_secs_f64().max(f64::EPSILON);

    debug!(name, iterations = config.iterations, ?avg_time, "benchmark done");

    Ok(BenchResult {
        name: name.to_string(),
        total_time,
        avg_time,
        min_time,
        max_time,
        throughput,
    })
}

/// Schema of the synthetic stream
pub fn bench_schema() -> RowSchema {
    RowSchema::new(vec![
        SourceColumn::new("value", SourceKind::Number),
        SourceColumn::new("category", SourceKind::String),
        SourceColumn::new("count", SourceKind::Integer),
        SourceColumn::date("day", "yyyy-MM-dd"),
    ])
}

/// Generate the synthetic stream
pub fn synthetic_rows(config: &BenchConfig) -> Vec<RawRow> {
    let distinct = config.distinct_categories.max(1);
    (0..config.rows)
        .map(|i| {
            vec![
                FieldValue::Number(i as f64 * 0.5),
                FieldValue::String(format!("category_{}", i % distinct)),
                FieldValue::Integer(i64::try_from(i % 1000).unwrap_or_default()),
                FieldValue::String(format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
            ]
        })
        .collect()
}

/// Benchmark offering rows to the reservoir alone
pub fn bench_reservoir_offer(config: &BenchConfig) -> Result<BenchResult> {
    let rows = synthetic_rows(config);
    let name = format!("Reservoir offer (k={})", config.sample_size);

    run_benchmark(&name, config, || {
        let mut sampler = ReservoirSampler::new(config.sample_size, config.seed);
        for row in &rows {
            sampler.offer(row.clone());
        }
        debug!(retained = sampler.buffer().len(), "reservoir benchmark iteration");
        Ok(())
    })
}

/// Benchmark a whole session: classification, sampling and dataset build
pub fn bench_session_end_to_end(config: &BenchConfig) -> Result<BenchResult> {
    let rows = synthetic_rows(config);
    let name = format!("Session end-to-end (k={})", config.sample_size);

    run_benchmark(&name, config, || {
        let mut source = MemoryRowSource::new(bench_schema(), rows.clone());
        let mut session = StreamSession::new(SessionConfig::reservoir(config.sample_size, config.seed));
        let dataset = drive(&mut source, &mut session)?;
        debug!(retained = dataset.num_rows(), "session benchmark iteration");
        Ok(())
    })
}
