//! Offer and acceptance rules of the negotiation protocol
//!
//! Offers are always computed from actor 1's side; acceptance treats actor 2
//! as the party with bargaining power. Both strategy kinds are plain tags:
//! they carry no state, so copying a simulation copies them for free.

use crate::error::StrategyParseError;
use crate::geometry::EdgeworthBox;
use crate::{Amount, Position, is_point_in_triangle};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule choosing the candidate allocation for actor 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OfferStrategy {
    /// Actor 2's Pareto intersection, the best point actor 2 still accepts
    #[serde(rename = "opposite pareto")]
    OppositePareto,
    /// Uniform point on the Pareto segment between both intersections
    #[serde(rename = "random pareto")]
    RandomPareto,
    /// Uniform point in the triangle spanned by the current allocation and both intersections
    #[default]
    #[serde(rename = "random triangle")]
    RandomTriangle,
}

const OFFER_NAMES: [(OfferStrategy, &str); 3] = [
    (OfferStrategy::OppositePareto, "opposite pareto"),
    (OfferStrategy::RandomPareto, "random pareto"),
    (OfferStrategy::RandomTriangle, "random triangle"),
];

impl OfferStrategy {
    pub const ALL: [OfferStrategy; 3] = [
        OfferStrategy::OppositePareto,
        OfferStrategy::RandomPareto,
        OfferStrategy::RandomTriangle,
    ];

    pub fn name(self) -> &'static str {
        OFFER_NAMES
            .iter()
            .find(|(strategy, _)| *strategy == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Candidate new holding for actor 1
    pub fn propose(self, edgeworth: &EdgeworthBox, rng: &mut StdRng) -> Position {
        match self {
            OfferStrategy::OppositePareto => edgeworth.curve2_pareto_intersection(),
            OfferStrategy::RandomPareto => {
                let p1 = edgeworth.curve1_pareto_intersection();
                let p2 = edgeworth.curve2_pareto_intersection();
                let factor = rng.random::<f64>();
                p1 + (p2 - p1) * factor
            }
            OfferStrategy::RandomTriangle => {
                let p0 = edgeworth.fix_point();
                let p1 = edgeworth.curve1_pareto_intersection();
                let p2 = edgeworth.curve2_pareto_intersection();
                sample_triangle(p0, p1, p2, rng)
            }
        }
    }
}

/// Uniform sample from the triangle (p0, p1, p2) without rejection
///
/// Draws in the parallelogram spanned by p0->p1 and p0->p2. A draw in the far
/// half is mirrored through the midpoint of the p1-p2 edge, which maps that
/// half exactly onto the triangle.
pub fn sample_triangle(p0: Position, p1: Position, p2: Position, rng: &mut StdRng) -> Position {
    let v01 = p1 - p0;
    let v02 = p2 - p0;
    let factor1 = rng.random::<f64>();
    let factor2 = rng.random::<f64>();
    let px = p0 + v01 * factor1 + v02 * factor2;

    if is_point_in_triangle(p0, p1, p2, px) {
        px
    } else {
        let origo = p1.midpoint(&p2);
        px + (origo - px) * 2.0
    }
}

impl fmt::Display for OfferStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OfferStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OFFER_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(strategy, _)| *strategy)
            .ok_or_else(|| StrategyParseError {
                kind: "offer",
                name: s.to_string(),
            })
    }
}

/// Rule judging whether the pair agrees on an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcceptanceStrategy {
    #[serde(rename = "always")]
    Always,
    /// Accept if actor 1's absolute utility gain does not exceed actor 2's
    #[default]
    #[serde(rename = "want higher gain")]
    HigherGain,
    /// Accept if actor 1's relative utility gain does not exceed actor 2's
    #[serde(rename = "want higher proportion")]
    HigherProportion,
}

const ACCEPTANCE_NAMES: [(AcceptanceStrategy, &str); 3] = [
    (AcceptanceStrategy::Always, "always"),
    (AcceptanceStrategy::HigherGain, "want higher gain"),
    (AcceptanceStrategy::HigherProportion, "want higher proportion"),
];

/// Utility levels of both actors before and after a candidate trade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityChange {
    pub actor1_original: Amount,
    pub actor2_original: Amount,
    pub actor1_new: Amount,
    pub actor2_new: Amount,
}

impl UtilityChange {
    pub fn evaluate(edgeworth: &EdgeworthBox, offer: Position) -> Self {
        let utility = edgeworth.utility();
        UtilityChange {
            actor1_original: utility.compute_at(edgeworth.actor1_holding()),
            actor2_original: utility.compute_at(edgeworth.actor2_holding()),
            actor1_new: utility.compute_at(offer),
            actor2_new: utility.compute_at(edgeworth.complement(offer)),
        }
    }
}

impl AcceptanceStrategy {
    pub const ALL: [AcceptanceStrategy; 3] = [
        AcceptanceStrategy::Always,
        AcceptanceStrategy::HigherGain,
        AcceptanceStrategy::HigherProportion,
    ];

    pub fn name(self) -> &'static str {
        ACCEPTANCE_NAMES
            .iter()
            .find(|(strategy, _)| *strategy == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Per-actor gain metric, `None` for strategies that do not compare gains
    pub fn gains(self, change: &UtilityChange) -> Option<(Amount, Amount)> {
        match self {
            AcceptanceStrategy::Always => None,
            AcceptanceStrategy::HigherGain => Some((
                change.actor1_new - change.actor1_original,
                change.actor2_new - change.actor2_original,
            )),
            AcceptanceStrategy::HigherProportion => Some((
                change.actor1_new / change.actor1_original,
                change.actor2_new / change.actor2_original,
            )),
        }
    }

    pub fn consider(self, edgeworth: &EdgeworthBox, offer: Position) -> bool {
        let change = UtilityChange::evaluate(edgeworth, offer);
        match self.gains(&change) {
            None => true,
            Some((actor1_gain, actor2_gain)) => actor1_gain <= actor2_gain,
        }
    }
}

impl fmt::Display for AcceptanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for AcceptanceStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ACCEPTANCE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(strategy, _)| *strategy)
            .ok_or_else(|| StrategyParseError {
                kind: "acceptance",
                name: s.to_string(),
            })
    }
}
