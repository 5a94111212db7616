//! Throughput benchmark: generate a batch of levels, derive a reference
//! solution for each and re-validate it, the same round trip the server does
//! for anti-cheat checks. Levels are independent pure computations, so the
//! batch runs on all cores.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::info;

use crate::generator::generate;
use crate::validator::{full_solution, validate};
use crate::{PuzzleError, Result};

#[derive(Debug)]
pub struct BenchmarkResults {
    pub total_duration: Duration,
    pub average_duration: Duration,
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub total_levels: usize,
    pub solved_levels: usize,
    pub total_arrows: usize,
    pub max_dag_depth: usize,
}

impl BenchmarkResults {
    pub fn success_rate(&self) -> f64 {
        (self.solved_levels as f64 / self.total_levels as f64) * 100.0
    }

    /// Pretty prints the benchmark results
    pub fn print_results(&self) {
        println!("\n=== Benchmark Results ===");
        println!("Total Duration: {:?}", self.total_duration);
        println!("Average Duration: {:?}", self.average_duration);
        println!("Min Duration: {:?}", self.min_duration);
        println!("Max Duration: {:?}", self.max_duration);
        println!("Total Levels: {}", self.total_levels);
        println!(
            "Generated + Solved + Validated: {} ({:.1}%)",
            self.solved_levels,
            self.success_rate()
        );
        println!("Total Arrows: {}", self.total_arrows);
        println!("Max DAG Depth: {}", self.max_dag_depth);
    }
}

/// Generates and re-validates levels 1..=count.
pub fn run_benchmark(level_count: usize) -> Result<BenchmarkResults> {
    if level_count == 0 {
        return Err(PuzzleError::Benchmark(
            "Level count must be greater than 0".to_string(),
        ));
    }

    info!(
        levels = level_count,
        workers = num_cpus::get(),
        "starting benchmark"
    );
    let start = Instant::now();

    // (duration, solved, arrows, depth) per level.
    let per_level: Vec<(Duration, bool, usize, usize)> = (1..=level_count as u32)
        .into_par_iter()
        .map(|level| {
            let level_start = Instant::now();
            let outcome = generate(level, None).and_then(|generated| {
                let solution = full_solution(
                    &generated.arrows,
                    generated.grid.width,
                    generated.grid.height,
                )?;
                Ok((generated, solution))
            });
            match outcome {
                Ok((generated, solution)) => {
                    let verdict = validate(&generated, &solution);
                    (
                        level_start.elapsed(),
                        verdict.valid,
                        generated.arrows.len(),
                        generated.meta.dag_depth,
                    )
                }
                Err(_) => (level_start.elapsed(), false, 0, 0),
            }
        })
        .collect();

    let total_duration = start.elapsed();
    let mut min_duration = Duration::from_secs(u64::MAX);
    let mut max_duration = Duration::ZERO;
    let mut summed = Duration::ZERO;
    let mut solved_levels = 0;
    let mut total_arrows = 0;
    let mut max_dag_depth = 0;

    for &(duration, solved, arrows, depth) in &per_level {
        min_duration = min_duration.min(duration);
        max_duration = max_duration.max(duration);
        summed += duration;
        if solved {
            solved_levels += 1;
        }
        total_arrows += arrows;
        max_dag_depth = max_dag_depth.max(depth);
    }

    Ok(BenchmarkResults {
        total_duration,
        average_duration: summed / level_count as u32,
        min_duration,
        max_duration,
        total_levels: level_count,
        solved_levels,
        total_arrows,
        max_dag_depth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_small() {
        let results = run_benchmark(5).unwrap();
        assert_eq!(results.total_levels, 5);
        assert_eq!(results.solved_levels, 5, "every generated level must solve");
        assert!(results.total_arrows > 0);
        assert!((results.success_rate() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_benchmark_invalid_count() {
        match run_benchmark(0) {
            Ok(_) => panic!("Should fail with zero levels"),
            Err(PuzzleError::Benchmark(_)) => (),
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }
}
