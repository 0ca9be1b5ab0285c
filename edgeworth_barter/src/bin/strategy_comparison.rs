//! Compare every offer/acceptance pairing on the same initial allocation
//!
//! Usage:
//!   cargo run --release --bin strategy_comparison -- [num_rounds] [num_seeds]

use edgeworth_barter::history::{mean, std_dev};
use edgeworth_barter::{AcceptanceStrategy, OfferStrategy, SetupParams, Simulation};
use std::env;
use tracing::error;
use tracing_subscriber::EnvFilter;

struct CaseResult {
    success_rate: f64,
    utility_gain: f64,
    wealth_deviation: f64,
}

fn run_case(
    params: &SetupParams,
    offer: OfferStrategy,
    acceptance: AcceptanceStrategy,
    num_rounds: usize,
) -> Option<CaseResult> {
    let mut simulation = Simulation::new(offer, acceptance);
    if let Err(e) = simulation.setup(params.clone()) {
        error!(error = %e, seed = params.seed, "Setup failed");
        return None;
    }
    for _ in 0..num_rounds {
        simulation.perform_next_round();
    }

    let history = simulation.history();
    let total_successful: f64 = history.num_successful.values().iter().sum();
    let max_trades = (num_rounds * simulation.num_max_trade()).max(1) as f64;
    let final_utility: f64 = simulation.compute_utilities().iter().sum();

    Some(CaseResult {
        success_rate: total_successful / max_trades * 100.0,
        utility_gain: final_utility - history.initial_sum_utility,
        wealth_deviation: history.wealth_deviation.last().unwrap_or(0.0),
    })
}

fn parse_arg(args: &[String], idx: usize, default: usize) -> usize {
    match args.get(idx) {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            error!(arg = %arg, "Expected a positive integer");
            std::process::exit(1);
        }),
        None => default,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    let num_rounds = parse_arg(&args, 1, 50);
    let num_seeds = parse_arg(&args, 2, 10);

    let base = SetupParams::default();
    println!("Comparing strategies over {} rounds", num_rounds);
    println!(
        "{} actors, {} x q1, {} x q2, {} seeds per case\n",
        base.num_actors, base.amount_q1, base.amount_q2, num_seeds
    );
    println!(
        "{:>16} | {:>22} | {:>9} | {:>12} | {:>10}",
        "Offer", "Acceptance", "Success %", "Utility gain", "Wealth sd"
    );
    println!(
        "{:-<16}-+-{:-<22}-+-{:-<9}-+-{:-<12}-+-{:-<10}",
        "", "", "", "", ""
    );

    for offer in OfferStrategy::ALL {
        for acceptance in AcceptanceStrategy::ALL {
            let results: Vec<CaseResult> = (0..num_seeds as u64)
                .filter_map(|seed| {
                    let params = SetupParams {
                        seed: base.seed + seed,
                        ..base.clone()
                    };
                    run_case(&params, offer, acceptance, num_rounds)
                })
                .collect();

            let success: Vec<f64> = results.iter().map(|r| r.success_rate).collect();
            let gain: Vec<f64> = results.iter().map(|r| r.utility_gain).collect();
            let deviation: Vec<f64> = results.iter().map(|r| r.wealth_deviation).collect();

            println!(
                "{:>16} | {:>22} | {:>8.2}% | {:>12.3} | {:>10.3}",
                offer.name(),
                acceptance.name(),
                mean(&success),
                mean(&gain),
                mean(&deviation),
            );
            if results.len() > 1 {
                println!(
                    "{:>16} | {:>22} | {:>8.2}  | {:>12.3} | {:>10.3}",
                    "",
                    "(sd over seeds)",
                    std_dev(&success),
                    std_dev(&gain),
                    std_dev(&deviation),
                );
            }
        }
    }
}
