use clap::{command, Parser, Subcommand};
use std::path::PathBuf;
use std::process::exit;

mod breaker;
mod client;
mod identity;
mod lifecycle;
mod results;
mod tokens;
mod types;

use crate::breaker::ConsecutiveFailureBreaker;
use crate::client::ApiClient;
use crate::lifecycle::{LifecycleRunner, StepCaller};
use crate::results::ResultAggregator;
use crate::tokens::TokenExtractor;
use crate::types::{Config, StepStatus};

#[derive(Parser)]
#[command(name = "auth-bench")]
#[command(about = "Load testing tool for the auth API's register/login/refresh/logout lifecycle")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    // Sequential run: one full lifecycle per iteration
    Run {
        #[arg(long, default_value = "1000")]
        iterations: u32,

        // Consecutive step failures before the run halts early
        #[arg(long, default_value = "10")]
        failure_threshold: u32,

        #[arg(long, default_value = "50")]
        progress_every: u32,

        #[arg(long, default_value = "response_times.csv")]
        output: PathBuf,
    },
}

type BenchError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() -> Result<(), BenchError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            iterations,
            failure_threshold,
            progress_every,
            output,
        } => {
            let config = envy::from_env::<Config>()?;
            let client = ApiClient::new(&config.api_base_url)?;
            // Check the API is reachable before burning any iterations
            if !client.is_available().await {
                eprintln!("Auth API not available at {}", config.api_base_url);
                exit(1);
            }

            println!("Starting auth lifecycle benchmark:");
            println!("  Base URL: {}", config.api_base_url);
            println!("  Iterations: {}", iterations);
            println!("  Failure threshold: {}", failure_threshold);
            println!();

            let extractor =
                TokenExtractor::new(&config.access_token_field, &config.refresh_token_field);
            let mut runner = LifecycleRunner::new(client, extractor);
            let mut breaker = ConsecutiveFailureBreaker::new(failure_threshold);
            let mut aggregator = ResultAggregator::new();

            run_benchmark(
                &mut runner,
                iterations,
                progress_every,
                &mut breaker,
                &mut aggregator,
            )
            .await;

            print_report(&aggregator);

            if aggregator.write_csv(&output)? {
                println!("Results saved to: {}", output.display());
            } else {
                println!("No successful requests recorded; CSV not written.");
            }
        }
    }

    Ok(())
}

// Drives the iteration loop: each iteration runs one full lifecycle, every
// step outcome feeds the breaker and the aggregator, failures are reported
// as they happen, and the breaker is checked before starting a new iteration.
async fn run_benchmark<C: StepCaller>(
    runner: &mut LifecycleRunner<C>,
    iterations: u32,
    progress_every: u32,
    breaker: &mut ConsecutiveFailureBreaker,
    aggregator: &mut ResultAggregator,
) {
    for iteration in 1..=iterations {
        if breaker.should_halt() {
            println!(
                "Halting early: {} consecutive failures after {} iterations",
                breaker.consecutive_failures(),
                iteration - 1
            );
            break;
        }

        for outcome in runner.run_iteration(iteration).await {
            if let StepStatus::Failure(reason) = &outcome.status {
                eprintln!(
                    "[iteration {}] {} failed: {}",
                    outcome.iteration,
                    outcome.endpoint.name(),
                    reason
                );
            }
            breaker.record(&outcome.status);
            aggregator.record(&outcome);
        }

        if progress_every > 0 && iteration % progress_every == 0 {
            println!("Completed {}/{} iterations", iteration, iterations);
        }
    }
}

fn print_report(aggregator: &ResultAggregator) {
    println!();
    for (endpoint, summary) in aggregator.summary() {
        println!(
            "{}: count={} min={:.4}s max={:.4}s mean={:.4}s ({}/{} succeeded)",
            endpoint.path(),
            summary.count,
            summary.min_secs,
            summary.max_secs,
            summary.mean_secs,
            aggregator.succeeded(endpoint),
            aggregator.attempted(endpoint),
        );
    }
    let (attempted, succeeded) = aggregator.totals();
    println!("Total: {} succeeded / {} attempted", succeeded, attempted);
}
