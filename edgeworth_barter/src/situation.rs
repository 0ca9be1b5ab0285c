use crate::geometry::EdgeworthBox;
use crate::strategy::{AcceptanceStrategy, OfferStrategy, UtilityChange};
use crate::utility::Utility;
use crate::{Amount, Position};
use rand::rngs::StdRng;
use tracing::warn;

/// One negotiation attempt between two actors
///
/// The offer and the verdict are fixed at construction. A situation is a
/// value: it never aliases the ledger, so it can be previewed, compared and
/// dropped freely.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeworthSituation {
    pub actor1_idx: usize,
    pub actor2_idx: usize,
    pub edgeworth: EdgeworthBox,
    /// Proposed new holding of actor 1
    pub result: Position,
    /// Verdict of the acceptance strategy alone
    pub accepted: bool,
    /// Accepted and large enough to count
    pub successful: bool,
}

/// Pair of actors and their current holdings, as handed to a situation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pairing {
    pub actor1_idx: usize,
    pub actor2_idx: usize,
    pub holding1: Position,
    pub holding2: Position,
}

/// Protocol settings shared by every negotiation of a simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Protocol {
    pub utility: Utility,
    pub offer: OfferStrategy,
    pub acceptance: AcceptanceStrategy,
    pub min_sum_trade: Amount,
}

impl EdgeworthSituation {
    pub fn new(pairing: Pairing, protocol: &Protocol, rng: &mut StdRng) -> Self {
        let edgeworth = EdgeworthBox::new(pairing.holding1, pairing.holding2, protocol.utility);
        let result = protocol.offer.propose(&edgeworth, rng);
        if !result.is_finite() {
            warn!(
                actor1 = pairing.actor1_idx,
                actor2 = pairing.actor2_idx,
                q1 = result.q1,
                q2 = result.q2,
                "Offer has non-finite coordinates"
            );
        }
        let accepted = protocol.acceptance.consider(&edgeworth, result);
        let traded = (result - edgeworth.actor1_holding()).manhattan_norm();
        let successful = accepted && traded >= protocol.min_sum_trade;

        EdgeworthSituation {
            actor1_idx: pairing.actor1_idx,
            actor2_idx: pairing.actor2_idx,
            edgeworth,
            result,
            accepted,
            successful,
        }
    }

    pub fn fix_point(&self) -> Position {
        self.edgeworth.fix_point()
    }

    /// New holding of actor 2 if the trade goes through
    pub fn actor2_result(&self) -> Position {
        self.edgeworth.complement(self.result)
    }

    pub fn q1_traded(&self) -> Amount {
        (self.result.q1 - self.edgeworth.actor1_holding().q1).abs()
    }

    pub fn q2_traded(&self) -> Amount {
        (self.result.q2 - self.edgeworth.actor1_holding().q2).abs()
    }

    /// |dq1| + |dq2| seen from actor 1
    pub fn sum_traded(&self) -> Amount {
        self.q1_traded() + self.q2_traded()
    }

    pub fn utility_change(&self) -> UtilityChange {
        UtilityChange::evaluate(&self.edgeworth, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn pairing() -> Pairing {
        Pairing {
            actor1_idx: 3,
            actor2_idx: 1,
            holding1: Position::new(10.0, 80.0),
            holding2: Position::new(90.0, 20.0),
        }
    }

    fn protocol(offer: OfferStrategy, acceptance: AcceptanceStrategy) -> Protocol {
        Protocol {
            utility: Utility::new(0.5, 0.5),
            offer,
            acceptance,
            min_sum_trade: 0.0,
        }
    }

    #[test]
    fn always_accepted_offer_succeeds() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = protocol(OfferStrategy::OppositePareto, AcceptanceStrategy::Always);
        let situation = EdgeworthSituation::new(pairing(), &p, &mut rng);

        assert!(situation.accepted);
        assert!(situation.successful);
        assert_eq!(situation.actor1_idx, 3);
        assert_eq!(situation.actor2_idx, 1);
        assert_eq!(situation.fix_point(), Position::new(10.0, 80.0));
    }

    #[test]
    fn goods_are_conserved_between_the_pair() {
        let mut rng = StdRng::seed_from_u64(2);
        let p = protocol(OfferStrategy::RandomTriangle, AcceptanceStrategy::Always);
        let situation = EdgeworthSituation::new(pairing(), &p, &mut rng);
        let total = situation.result + situation.actor2_result();
        assert_relative_eq!(total.q1, 100.0, epsilon = 1e-9);
        assert_relative_eq!(total.q2, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn traded_amounts_measured_from_actor1() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = protocol(OfferStrategy::OppositePareto, AcceptanceStrategy::Always);
        let situation = EdgeworthSituation::new(pairing(), &p, &mut rng);
        let expected_q1 = situation.result.q1 - 10.0;
        let expected_q2 = 80.0 - situation.result.q2;
        assert_relative_eq!(situation.q1_traded(), expected_q1, epsilon = 1e-12);
        assert_relative_eq!(situation.q2_traded(), expected_q2, epsilon = 1e-12);
        assert_relative_eq!(situation.sum_traded(), expected_q1 + expected_q2, epsilon = 1e-12);
    }

    #[test]
    fn insignificant_trade_is_not_successful() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut p = protocol(OfferStrategy::OppositePareto, AcceptanceStrategy::Always);
        p.min_sum_trade = 1.0e6;
        let situation = EdgeworthSituation::new(pairing(), &p, &mut rng);
        assert!(situation.accepted);
        assert!(!situation.successful);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut rng = StdRng::seed_from_u64(4);
        let p = protocol(OfferStrategy::OppositePareto, AcceptanceStrategy::Always);
        let probe = EdgeworthSituation::new(pairing(), &p, &mut rng);

        let exact = Protocol {
            min_sum_trade: probe.sum_traded(),
            ..p
        };
        let situation = EdgeworthSituation::new(pairing(), &exact, &mut rng);
        assert!(situation.successful);
    }

    #[test]
    fn rejected_offer_is_not_successful() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = protocol(OfferStrategy::OppositePareto, AcceptanceStrategy::HigherGain);
        let situation = EdgeworthSituation::new(pairing(), &p, &mut rng);
        assert!(!situation.accepted);
        assert!(!situation.successful);
    }
}
