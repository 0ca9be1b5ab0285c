//! Error types for the `edgeworth_barter` crate.

use crate::{Amount, Good};

/// Reasons a `Simulation::setup` call is rejected.
///
/// Every check runs before the simulation is touched, so a rejected setup
/// leaves the previous state intact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SetupError {
    /// Actors trade two at a time, so the population must be even.
    #[error("number of actors must be even, got {0}")]
    OddActorCount(usize),

    /// At least one pair is needed to trade.
    #[error("at least two actors are required, got {0}")]
    TooFewActors(usize),

    /// Total supply of a good must be a positive, finite amount.
    #[error("total amount of {good} must be positive, got {amount}")]
    NonPositiveAmount {
        /// The offending good.
        good: Good,
        /// The configured total.
        amount: Amount,
    },

    /// Cobb-Douglas exponents must be positive and finite.
    #[error("utility exponent {which} must be positive, got {value}")]
    NonPositiveExponent {
        /// Name of the exponent (`alfa1` or `alfa2`).
        which: &'static str,
        /// The configured value.
        value: f64,
    },

    /// The significance factor must be a finite, non-negative fraction.
    #[error("minimum trade factor must be finite and non-negative, got {0}")]
    InvalidTradeFactor(f64),
}

/// An unknown textual strategy identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} strategy: {name:?}")]
pub struct StrategyParseError {
    /// `offer` or `acceptance`.
    pub kind: &'static str,
    /// The name that failed to parse.
    pub name: String,
}

/// Errors raised while loading an experiment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid simulation parameters: {0}")]
    Setup(#[from] SetupError),
}
