//! Bilateral barter between actors holding two divisible goods
//!
//! Actors are paired up round-robin. Each pair negotiates inside its
//! Edgeworth box: an offer strategy picks a candidate allocation between the
//! two indifference curves and an acceptance strategy decides whether the
//! pair agrees. Accepted trades move goods between the two actors; every
//! completed round is folded into a history of aggregates and distributions.
//!
//! Key pieces:
//! - `Simulation`: owns the ledger, the scheduler, the history and the RNG
//! - `EdgeworthSituation`: one negotiation between two actors
//! - `OfferStrategy` / `AcceptanceStrategy`: the pluggable protocol

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod output;
pub mod resources;
pub mod scheduler;
pub mod simulation;
pub mod situation;
pub mod strategy;
pub mod utility;

pub use config::ExperimentConfig;
pub use error::{ConfigError, SetupError, StrategyParseError};
pub use geometry::EdgeworthBox;
pub use history::{Distribution, History, Moment, RoundInfo, TimeSeries};
pub use resources::AllocationMethod;
pub use scheduler::PairingScheduler;
pub use simulation::{SetupParams, Simulation};
pub use situation::EdgeworthSituation;
pub use strategy::{AcceptanceStrategy, OfferStrategy};
pub use utility::{IndifferenceCurve, Utility};

/// A non-negative quantity of a good, a utility level or a wealth value
pub type Amount = f64;

/// One of the two goods traded in the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Good {
    Q1,
    Q2,
}

impl Good {
    pub const ALL: [Good; 2] = [Good::Q1, Good::Q2];

    pub fn index(self) -> usize {
        match self {
            Good::Q1 => 0,
            Good::Q2 => 1,
        }
    }
}

impl std::fmt::Display for Good {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Good::Q1 => write!(f, "q1"),
            Good::Q2 => write!(f, "q2"),
        }
    }
}

/// A point in the Edgeworth box, in actor 1's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub q1: Amount,
    pub q2: Amount,
}

impl Position {
    pub fn new(q1: Amount, q2: Amount) -> Self {
        Position { q1, q2 }
    }

    /// Sum of the absolute coordinate values
    pub fn manhattan_norm(&self) -> Amount {
        self.q1.abs() + self.q2.abs()
    }

    pub fn is_finite(&self) -> bool {
        self.q1.is_finite() && self.q2.is_finite()
    }

    pub fn midpoint(&self, other: &Position) -> Position {
        *self + (*other - *self) * 0.5
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.q1 + other.q1, self.q2 + other.q2)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position::new(self.q1 - other.q1, self.q2 - other.q2)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, factor: f64) -> Position {
        Position::new(self.q1 * factor, self.q2 * factor)
    }
}

/// Barycentric containment test for `px` in the triangle (p0, p1, p2)
///
/// Points on an edge count as inside. A degenerate triangle (collinear
/// corners) contains every point, so callers never reflect in that case.
pub fn is_point_in_triangle(p0: Position, p1: Position, p2: Position, px: Position) -> bool {
    let v0 = p2 - p0;
    let v1 = p1 - p0;
    let v2 = px - p0;

    let dot00 = dot(v0, v0);
    let dot01 = dot(v0, v1);
    let dot02 = dot(v0, v2);
    let dot11 = dot(v1, v1);
    let dot12 = dot(v1, v2);

    // Gram determinant, compared against the squared edge lengths so the
    // test does not depend on the size of the box
    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() <= f64::EPSILON * dot00 * dot11 {
        return true;
    }

    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;

    // Small slack so samples exactly on the p1-p2 edge are not reflected
    let slack = 1e-12;
    u >= -slack && v >= -slack && u + v <= 1.0 + slack
}

fn dot(a: Position, b: Position) -> f64 {
    a.q1 * b.q1 + a.q2 * b.q2
}

/// Sample `func` on `[range_start, range_finish]` every `resolution` units
///
/// Returns parallel x and y vectors, ready for plotting consumers.
pub fn sample_function<F>(
    func: F,
    range_start: Amount,
    range_finish: Amount,
    resolution: Amount,
) -> (Vec<Amount>, Vec<Amount>)
where
    F: Fn(Amount) -> Amount,
{
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    if resolution <= 0.0 || !resolution.is_finite() {
        return (xs, ys);
    }

    let mut step = 0usize;
    loop {
        let x = range_start + resolution * step as f64;
        if x > range_finish {
            break;
        }
        xs.push(x);
        ys.push(func(x));
        step += 1;
    }
    (xs, ys)
}
