use crate::{Amount, Position};
use serde::{Deserialize, Serialize};

/// Cobb-Douglas utility shared by every actor: U(q1, q2) = q1^alfa1 * q2^alfa2
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Utility {
    pub alfa1: f64,
    pub alfa2: f64,
}

impl Utility {
    pub fn new(alfa1: f64, alfa2: f64) -> Self {
        Utility { alfa1, alfa2 }
    }

    pub fn compute(&self, q1: Amount, q2: Amount) -> Amount {
        q1.powf(self.alfa1) * q2.powf(self.alfa2)
    }

    pub fn compute_at(&self, position: Position) -> Amount {
        self.compute(position.q1, position.q2)
    }
}

impl Default for Utility {
    fn default() -> Self {
        Utility::new(0.5, 0.5)
    }
}

/// Level set of a `Utility` through a fixed holding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndifferenceCurve {
    pub utility: Utility,
    pub fix_q1: Amount,
    pub fix_q2: Amount,
}

impl IndifferenceCurve {
    pub fn new(utility: Utility, fix_q1: Amount, fix_q2: Amount) -> Self {
        IndifferenceCurve {
            utility,
            fix_q1,
            fix_q2,
        }
    }

    pub fn through(utility: Utility, holding: Position) -> Self {
        IndifferenceCurve::new(utility, holding.q1, holding.q2)
    }

    pub fn fix_point(&self) -> Position {
        Position::new(self.fix_q1, self.fix_q2)
    }

    /// Utility level every point of the curve shares
    pub fn level(&self) -> Amount {
        self.utility.compute(self.fix_q1, self.fix_q2)
    }

    /// Amount of good 2 that keeps the curve's utility level at `q1`
    ///
    /// Closed-form inverse of U(q1, q2) = U(fix_q1, fix_q2). A zero holding
    /// on either side yields a non-finite or zero result; it is passed on.
    pub fn q2_at(&self, q1: Amount) -> Amount {
        self.fix_q2 * (self.fix_q1 / q1).powf(self.utility.alfa1 / self.utility.alfa2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cobb_douglas_square_root() {
        let utility = Utility::new(0.5, 0.5);
        assert_relative_eq!(utility.compute(4.0, 9.0), 6.0);
        assert_relative_eq!(utility.compute_at(Position::new(16.0, 1.0)), 4.0);
    }

    #[test]
    fn asymmetric_exponents() {
        let utility = Utility::new(1.0, 2.0);
        assert_relative_eq!(utility.compute(3.0, 2.0), 12.0);
    }

    #[test]
    fn curve_passes_through_fix_point() {
        let curve = IndifferenceCurve::new(Utility::new(0.3, 0.7), 12.0, 5.0);
        assert_relative_eq!(curve.q2_at(12.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn curve_keeps_utility_constant() {
        let utility = Utility::new(0.4, 0.6);
        let curve = IndifferenceCurve::new(utility, 20.0, 30.0);
        for q1 in [1.0, 5.0, 17.5, 40.0, 99.0] {
            let q2 = curve.q2_at(q1);
            assert_relative_eq!(utility.compute(q1, q2), curve.level(), max_relative = 1e-12);
        }
    }

    #[test]
    fn zero_holding_is_not_finite() {
        let curve = IndifferenceCurve::new(Utility::default(), 10.0, 10.0);
        assert!(!curve.q2_at(0.0).is_finite());
    }
}
