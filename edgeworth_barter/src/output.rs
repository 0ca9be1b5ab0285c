//! Export of a finished run for offline analysis
//!
//! Writes the per-round aggregates and the per-round distributions as CSV,
//! and a JSON summary with the parameters needed to reproduce the run.

use crate::history::{History, TimeSeries};
use crate::simulation::{SetupParams, Simulation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Metadata for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub name: String,
    pub params: SetupParams,
    pub offer_strategy: String,
    pub acceptance_strategy: String,
    pub num_rounds: usize,
    pub timestamp: String,
}

/// Aggregates over the whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_successful: f64,
    pub success_rate: f64,
    pub total_q1_traded: f64,
    pub total_q2_traded: f64,
    pub initial_sum_utility: f64,
    pub final_sum_utility: f64,
    pub final_wealth_deviation: f64,
}

impl RunSummary {
    pub fn from_simulation(simulation: &Simulation) -> Self {
        let history = simulation.history();
        let total_successful: f64 = history.num_successful.values().iter().sum();
        let max_trades = (history.time * simulation.num_max_trade()) as f64;
        let success_rate = if max_trades > 0.0 {
            total_successful / max_trades
        } else {
            0.0
        };

        RunSummary {
            total_successful,
            success_rate,
            total_q1_traded: history.q1_traded.values().iter().sum(),
            total_q2_traded: history.q2_traded.values().iter().sum(),
            initial_sum_utility: history.initial_sum_utility,
            final_sum_utility: simulation.compute_utilities().iter().sum(),
            final_wealth_deviation: history.wealth_deviation.last().unwrap_or(0.0),
        }
    }
}

/// Top-level container for a run's output
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    pub metadata: RunMetadata,
    pub summary: RunSummary,
    #[serde(skip)]
    pub history: History,
}

impl SimulationOutput {
    /// Capture the current state of a simulation that has been set up
    pub fn from_simulation(name: &str, simulation: &Simulation) -> Option<Self> {
        let params = simulation.params()?.clone();
        let history = simulation.history().clone();
        Some(SimulationOutput {
            metadata: RunMetadata {
                name: name.to_string(),
                params,
                offer_strategy: simulation.offer_strategy().to_string(),
                acceptance_strategy: simulation.acceptance_strategy().to_string(),
                num_rounds: history.time,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            summary: RunSummary::from_simulation(simulation),
            history,
        })
    }

    /// Write per-round aggregates to CSV
    pub fn write_rounds_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "round",
            "q1_traded",
            "q2_traded",
            "num_successful",
            "sum_utility",
            "wealth_deviation",
        ])?;

        let history = &self.history;
        for idx in 0..history.time {
            wtr.write_record(&[
                (idx + 1).to_string(),
                value_at(&history.q1_traded, idx),
                value_at(&history.q2_traded, idx),
                value_at(&history.num_successful, idx),
                value_at(&history.sum_utilities, idx),
                value_at(&history.wealth_deviation, idx),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write every moment's histograms to CSV, one row per bucket
    pub fn write_distributions_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record(["round", "quantity", "bucket_center", "count"])?;

        for (round, moment) in self.history.moments.iter().enumerate() {
            for (quantity, distribution) in moment.distributions() {
                for (center, count) in distribution
                    .bucket_centers
                    .iter()
                    .zip(&distribution.counts)
                {
                    wtr.write_record(&[
                        round.to_string(),
                        quantity.to_string(),
                        center.to_string(),
                        count.to_string(),
                    ])?;
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write summary JSON with metadata and run aggregates
    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write all outputs to a directory
    ///
    /// Creates:
    /// - rounds.csv
    /// - distributions.csv
    /// - summary.json
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<(), Box<dyn std::error::Error>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        self.write_rounds_csv(dir.join("rounds.csv"))?;
        self.write_distributions_csv(dir.join("distributions.csv"))?;
        self.write_summary_json(dir.join("summary.json"))?;

        Ok(())
    }
}

fn value_at(series: &TimeSeries, idx: usize) -> String {
    series.get(idx).map(|v| v.to_string()).unwrap_or_default()
}
