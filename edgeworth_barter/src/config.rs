//! Experiment configuration loaded from TOML
//!
//! ```toml
//! [experiment]
//! name = "baseline"
//! num_rounds = 200
//! output_dir = "results/baseline"
//!
//! [simulation]
//! seed = 1
//! num_actors = 100
//! amount_q1 = 1000.0
//! amount_q2 = 1000.0
//! alfa1 = 0.5
//! alfa2 = 0.5
//! min_trade_factor = 0.01
//! max_round_without_trade = 10
//! allocation = "rescaled"
//!
//! [strategy]
//! offer = "random triangle"
//! acceptance = "want higher gain"
//! ```

use crate::error::ConfigError;
use crate::simulation::{SetupParams, Simulation};
use crate::strategy::{AcceptanceStrategy, OfferStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentMetadata,
    pub simulation: SetupParams,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    pub num_rounds: usize,
    /// Where CSV/JSON results go; nothing is written when absent
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub offer: OfferStrategy,
    pub acceptance: AcceptanceStrategy,
}

impl ExperimentConfig {
    /// 100 actors, 1000 units of each good, symmetric square-root utility
    pub fn baseline() -> Self {
        ExperimentConfig {
            experiment: ExperimentMetadata {
                name: "baseline".to_string(),
                num_rounds: 200,
                output_dir: None,
            },
            simulation: SetupParams::default(),
            strategy: StrategyConfig::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: ExperimentConfig = toml::from_str(s)?;
        config.simulation.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// A simulation configured with this experiment's strategies and parameters
    pub fn build_simulation(&self) -> Result<Simulation, ConfigError> {
        let mut simulation = Simulation::new(self.strategy.offer, self.strategy.acceptance);
        simulation.setup(self.simulation.clone())?;
        Ok(simulation)
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig::baseline()
    }
}
