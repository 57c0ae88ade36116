//! Benchmark runner and result types
//!
//! Provides infrastructure for running benchmarks and collecting results.
//! Each benchmark builds its objects and bytecode on a fresh VM, then runs
//! the same code block repeatedly so its cache sites stay warm.

use interpreter::{CodeBlock, PropertyAccessStats, RuntimeConfig, VmResult, VM};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Prepares a VM for a benchmark and returns the code block to repeat
pub type Setup = fn(&mut VM) -> VmResult<CodeBlock>;

/// Verifies the VM state after all iterations ran
pub type Check = fn(&VM, u64) -> Result<(), String>;

/// A single benchmark
#[derive(Debug, Clone)]
pub struct Benchmark {
    /// Name of the benchmark
    pub name: String,
    /// Description of what the benchmark tests
    pub description: String,
    /// How many times the code block is executed
    pub iterations: u64,
    /// Builds objects and bytecode
    pub setup: Setup,
    /// Optional post-run verification
    pub check: Option<Check>,
}

/// Result of running a benchmark
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark
    pub name: String,
    /// Description of the benchmark
    pub description: String,
    /// Number of executions of the code block
    pub iterations: u64,
    /// Duration in milliseconds
    pub duration_ms: f64,
    /// Executions per second
    pub ops_per_sec: Option<f64>,
    /// Property access counters collected during the timed loop
    pub stats: Option<PropertyAccessStats>,
    /// Whether the benchmark completed successfully
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
}

fn ops_per_sec(iterations: u64, duration_ms: f64) -> Option<f64> {
    if duration_ms > 0.0 {
        Some(iterations as f64 / (duration_ms / 1000.0))
    } else {
        None
    }
}

impl Benchmark {
    /// Run this benchmark on a fresh VM built from `config`
    pub fn run(&self, config: &RuntimeConfig) -> BenchmarkResult {
        match self.execute(config) {
            Ok((duration_ms, stats)) => BenchmarkResult {
                name: self.name.clone(),
                description: self.description.clone(),
                iterations: self.iterations,
                duration_ms,
                ops_per_sec: ops_per_sec(self.iterations, duration_ms),
                stats: Some(stats),
                success: true,
                error: None,
            },
            Err(error) => BenchmarkResult {
                name: self.name.clone(),
                description: self.description.clone(),
                iterations: self.iterations,
                duration_ms: 0.0,
                ops_per_sec: None,
                stats: None,
                success: false,
                error: Some(error),
            },
        }
    }

    fn execute(&self, config: &RuntimeConfig) -> Result<(f64, PropertyAccessStats), String> {
        let mut vm = VM::with_config(config.clone()).map_err(|e| e.to_string())?;
        let mut block = (self.setup)(&mut vm).map_err(|e| e.to_string())?;
        vm.runtime_mut().reset_stats();

        let start = Instant::now();
        for _ in 0..self.iterations {
            vm.execute(&mut block).map_err(|e| e.to_string())?;
        }
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        let stats = vm.stats();
        debug!(
            benchmark = %self.name,
            duration_ms,
            read_hit_rate = stats.reads.hit_rate(),
            write_hit_rate = stats.writes.hit_rate(),
            "benchmark finished"
        );

        if let Some(check) = self.check {
            check(&vm, self.iterations)?;
        }
        Ok((duration_ms, stats))
    }

    /// Run this benchmark `runs` times and return the average duration
    pub fn run_multiple(&self, config: &RuntimeConfig, runs: usize) -> BenchmarkResult {
        let runs = runs.max(1);
        let mut total_duration_ms = 0.0;
        let mut result = self.run(config);

        for run in 1..=runs {
            if !result.success {
                return result; // Return error immediately
            }
            total_duration_ms += result.duration_ms;
            if run < runs {
                result = self.run(config);
            }
        }

        result.duration_ms = total_duration_ms / runs as f64;
        result.ops_per_sec = ops_per_sec(result.iterations, result.duration_ms);
        result
    }
}

/// Suite of benchmarks
#[derive(Debug, Clone)]
pub struct BenchmarkSuite {
    /// Name of the suite
    pub name: String,
    /// Benchmarks in this suite
    pub benchmarks: Vec<Benchmark>,
}

impl BenchmarkSuite {
    /// Create a new benchmark suite
    pub fn new(name: String) -> Self {
        Self {
            name,
            benchmarks: Vec::new(),
        }
    }

    /// Add a benchmark to this suite
    pub fn add(&mut self, benchmark: Benchmark) {
        self.benchmarks.push(benchmark);
    }

    /// Run all benchmarks in this suite
    pub fn run(&self, config: &RuntimeConfig) -> Vec<BenchmarkResult> {
        self.benchmarks.iter().map(|b| b.run(config)).collect()
    }

    /// Run all benchmarks multiple times and average
    pub fn run_multiple(&self, config: &RuntimeConfig, runs: usize) -> Vec<BenchmarkResult> {
        self.benchmarks
            .iter()
            .map(|b| b.run_multiple(config, runs))
            .collect()
    }
}

/// Format benchmark results as a human-readable table
pub fn format_results(results: &[BenchmarkResult]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{:<30} {:<15} {:<10} {:<10} {:<10}\n",
        "Benchmark", "Duration (ms)", "Read hit", "Write hit", "Status"
    ));
    output.push_str(&format!("{}\n", "=".repeat(80)));

    for result in results {
        let status = if result.success { "✓ PASS" } else { "✗ FAIL" };
        let (read_hits, write_hits) = match &result.stats {
            Some(stats) => (
                format!("{:.1}%", stats.reads.hit_rate() * 100.0),
                format!("{:.1}%", stats.writes.hit_rate() * 100.0),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        output.push_str(&format!(
            "{:<30} {:>13.2} ms {:>9} {:>10}  {:<10}\n",
            result.name, result.duration_ms, read_hits, write_hits, status
        ));

        if let Some(error) = &result.error {
            output.push_str(&format!("  Error: {}\n", error));
        }
    }

    output
}

/// Format benchmark results as JSON
pub fn format_results_json(results: &[BenchmarkResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(results)
}
