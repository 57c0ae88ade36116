//! Property access benchmark CLI
//!
//! Command-line interface for running the property access benchmarks.

use std::path::PathBuf;
use std::process;

use benchmarks::{micro, runner};
use clap::Parser;
use interpreter::RuntimeConfig;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(
    name = "propcache-bench",
    version,
    about = "Benchmarks for inline-cached property access"
)]
struct Cli {
    /// Benchmark to run, or "all"
    #[arg(default_value = "all")]
    suite: String,

    /// Runs per benchmark; durations are averaged
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// JSON file with a runtime configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<RuntimeConfig, String> {
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    RuntimeConfig::from_json_str(&text)
        .map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let benchmarks: Vec<_> = micro::create_benchmarks()
        .into_iter()
        .filter(|b| cli.suite == "all" || b.name == cli.suite)
        .collect();
    if benchmarks.is_empty() {
        eprintln!("Error: Unknown benchmark '{}'", cli.suite);
        let names: Vec<_> = micro::create_benchmarks().into_iter().map(|b| b.name).collect();
        eprintln!("Valid benchmarks: all, {}", names.join(", "));
        process::exit(1);
    }

    if !cli.json {
        println!(
            "Running {} benchmark(s), {} cache entries per site...\n",
            benchmarks.len(),
            config.cache_entries()
        );
    }
    let results: Vec<_> = benchmarks
        .iter()
        .map(|b| b.run_multiple(&config, cli.iterations))
        .collect();

    // Output results
    if cli.json {
        match runner::format_results_json(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error formatting JSON: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", runner::format_results(&results));

        let successful = results.iter().filter(|r| r.success).count();
        let total_time: f64 = results.iter().map(|r| r.duration_ms).sum();

        println!("\nSummary:");
        println!("  Total benchmarks: {}", results.len());
        println!("  Successful: {}", successful);
        println!("  Failed: {}", results.len() - successful);
        println!("  Total time: {:.2} ms ({:.2} s)", total_time, total_time / 1000.0);
    }

    if results.iter().any(|r| !r.success) {
        process::exit(1);
    }
}
