//! Edgeworth box geometry for a pair of actors
//!
//! All positions are expressed in actor 1's coordinates: actor 1's origin is
//! the lower-left corner, actor 2's origin the upper-right corner at
//! (`q1_sum`, `q2_sum`).
//!
//! The contract curve is approximated by the box diagonal
//! `q2 = q1 * q2_sum / q1_sum`. With Cobb-Douglas utilities this is exact
//! only when both actors share the same exponents, which is how the
//! simulation is always configured. The intersection formulas below rely on
//! that line being straight.

use crate::utility::{IndifferenceCurve, Utility};
use crate::{Amount, Position, sample_function};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeworthBox {
    pub curve1: IndifferenceCurve,
    pub curve2: IndifferenceCurve,
    pub q1_sum: Amount,
    pub q2_sum: Amount,
}

impl EdgeworthBox {
    /// Build the box from both actors' current holdings
    pub fn new(holding1: Position, holding2: Position, utility: Utility) -> Self {
        EdgeworthBox {
            curve1: IndifferenceCurve::through(utility, holding1),
            curve2: IndifferenceCurve::through(utility, holding2),
            q1_sum: holding1.q1 + holding2.q1,
            q2_sum: holding1.q2 + holding2.q2,
        }
    }

    pub fn utility(&self) -> Utility {
        self.curve1.utility
    }

    /// Actor 1's current holding, the point both curves pass through
    pub fn fix_point(&self) -> Position {
        self.curve1.fix_point()
    }

    pub fn actor1_holding(&self) -> Position {
        self.curve1.fix_point()
    }

    pub fn actor2_holding(&self) -> Position {
        self.curve2.fix_point()
    }

    /// Actor 2's holding if actor 1 ends up at `position`
    pub fn complement(&self, position: Position) -> Position {
        Position::new(self.q1_sum - position.q1, self.q2_sum - position.q2)
    }

    pub fn curve1_q2(&self, q1: Amount) -> Amount {
        self.curve1.q2_at(q1)
    }

    /// Actor 2's indifference curve seen from actor 1's origin
    pub fn curve2_q2(&self, q1: Amount) -> Amount {
        self.q2_sum - self.curve2.q2_at(self.q1_sum - q1)
    }

    pub fn pareto_q2(&self, q1: Amount) -> Amount {
        q1 * self.q2_sum / self.q1_sum
    }

    pub fn pareto_point(&self, q1: Amount) -> Position {
        Position::new(q1, self.pareto_q2(q1))
    }

    /// q1 where `curve` meets the linear Pareto set, in the curve owner's coordinates
    pub fn pareto_intersection_q1(&self, curve: &IndifferenceCurve) -> Amount {
        let alfa1 = curve.utility.alfa1;
        let alfa2 = curve.utility.alfa2;
        (self.q1_sum / self.q2_sum * curve.fix_q2 * curve.fix_q1.powf(alfa1 / alfa2))
            .powf(alfa2 / (alfa1 + alfa2))
    }

    /// Where actor 1's curve crosses the Pareto set
    pub fn curve1_pareto_intersection(&self) -> Position {
        self.pareto_point(self.pareto_intersection_q1(&self.curve1))
    }

    /// Where actor 2's curve crosses the Pareto set, in actor 1's coordinates
    pub fn curve2_pareto_intersection(&self) -> Position {
        self.pareto_point(self.q1_sum - self.pareto_intersection_q1(&self.curve2))
    }

    /// Sampled points of actor 1's curve across the box, for plotting
    pub fn sample_curve1(&self, resolution: Amount) -> (Vec<Amount>, Vec<Amount>) {
        sample_function(|q1| self.curve1_q2(q1), resolution, self.q1_sum, resolution)
    }

    /// Sampled points of actor 2's curve across the box, for plotting
    pub fn sample_curve2(&self, resolution: Amount) -> (Vec<Amount>, Vec<Amount>) {
        sample_function(
            |q1| self.curve2_q2(q1),
            0.0,
            self.q1_sum - resolution,
            resolution,
        )
    }

    /// Sampled points of the Pareto set across the box, for plotting
    pub fn sample_pareto_set(&self, resolution: Amount) -> (Vec<Amount>, Vec<Amount>) {
        sample_function(|q1| self.pareto_q2(q1), 0.0, self.q1_sum, resolution)
    }
}
