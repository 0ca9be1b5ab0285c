//! Batch runner for the barter simulation
//!
//! Usage:
//!   cargo run --release -- [experiment_config.toml]
//!
//! Without a config file the baseline experiment is run. Set `RUST_LOG=debug`
//! to see every trade attempt.

use edgeworth_barter::output::SimulationOutput;
use edgeworth_barter::{ExperimentConfig, Good, Simulation};
use std::env;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            info!(path = %path, "Loading experiment config");
            match ExperimentConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    error!(error = %e, "Could not load experiment config");
                    std::process::exit(1);
                }
            }
        }
        None => ExperimentConfig::baseline(),
    };

    println!("Edgeworth Box Barter Simulation");
    println!("===============================\n");
    println!("Experiment: {}", config.experiment.name);
    println!("  Actors: {}", config.simulation.num_actors);
    println!(
        "  Goods: {} x q1, {} x q2",
        config.simulation.amount_q1, config.simulation.amount_q2
    );
    println!(
        "  Utility: q1^{} * q2^{}",
        config.simulation.alfa1, config.simulation.alfa2
    );
    println!("  Offer: {}", config.strategy.offer);
    println!("  Acceptance: {}", config.strategy.acceptance);
    println!("  Rounds: {}\n", config.experiment.num_rounds);

    let mut simulation = match config.build_simulation() {
        Ok(simulation) => simulation,
        Err(e) => {
            error!(error = %e, "Could not set up simulation");
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    for _ in 0..config.experiment.num_rounds {
        simulation.perform_next_round();
    }
    let elapsed = start.elapsed();

    print_summary(&simulation);
    println!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    if let Some(dir) = &config.experiment.output_dir {
        let Some(output) = SimulationOutput::from_simulation(&config.experiment.name, &simulation)
        else {
            error!("Simulation has no parameters to export");
            std::process::exit(1);
        };
        if let Err(e) = output.write_all(dir) {
            error!(error = %e, dir = %dir.display(), "Could not write results");
            std::process::exit(1);
        }
        println!("Results saved to: {}", dir.display());
    }
}

fn print_summary(simulation: &Simulation) {
    let history = simulation.history();
    let total_successful: f64 = history.num_successful.values().iter().sum();
    let max_trades = history.time * simulation.num_max_trade();

    println!("Results after {} rounds", history.time);
    println!(
        "  Successful trades: {} of {} ({:.1}%)",
        total_successful,
        max_trades,
        if max_trades > 0 {
            total_successful / max_trades as f64 * 100.0
        } else {
            0.0
        }
    );
    println!(
        "  Sum of utilities: {:.3} -> {:.3}",
        history.initial_sum_utility,
        history.sum_utilities.last().unwrap_or(history.initial_sum_utility)
    );
    println!(
        "  Wealth deviation: {:.3}",
        history.wealth_deviation.last().unwrap_or(0.0)
    );
    if let (Some(q1), Some(q2)) = (history.q1_traded.last(), history.q2_traded.last()) {
        println!("  Last round traded: {:.3} q1, {:.3} q2", q1, q2);
    }
    println!(
        "  Goods conserved: q1={} q2={}",
        simulation.check_resources(Good::Q1),
        simulation.check_resources(Good::Q2)
    );
}
