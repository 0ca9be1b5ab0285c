use crate::error::SetupError;
use crate::history::{History, Resolutions, RoundInfo, Snapshot};
use crate::resources::{AllocationMethod, setup_resources};
use crate::scheduler::PairingScheduler;
use crate::situation::{EdgeworthSituation, Pairing, Protocol};
use crate::strategy::{AcceptanceStrategy, OfferStrategy};
use crate::utility::Utility;
use crate::{Amount, Good, Position};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Relative drift per actor allowed before goods count as not conserved
pub const CONSERVATION_TOLERANCE: f64 = 1e-12;

/// Parameters of `Simulation::setup`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupParams {
    pub seed: u64,
    pub num_actors: usize,
    pub amount_q1: Amount,
    pub amount_q2: Amount,
    pub alfa1: f64,
    pub alfa2: f64,
    /// Fraction of mean per-actor wealth below which a trade does not count
    pub min_trade_factor: f64,
    /// Kept for callers that want a stopping hint; the engine never reads it
    pub max_round_without_trade: usize,
    #[serde(default)]
    pub allocation: AllocationMethod,
}

impl SetupParams {
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.num_actors % 2 != 0 {
            return Err(SetupError::OddActorCount(self.num_actors));
        }
        if self.num_actors < 2 {
            return Err(SetupError::TooFewActors(self.num_actors));
        }
        for (good, amount) in [(Good::Q1, self.amount_q1), (Good::Q2, self.amount_q2)] {
            if !(amount.is_finite() && amount > 0.0) {
                return Err(SetupError::NonPositiveAmount { good, amount });
            }
        }
        for (which, value) in [("alfa1", self.alfa1), ("alfa2", self.alfa2)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SetupError::NonPositiveExponent { which, value });
            }
        }
        if !(self.min_trade_factor.is_finite() && self.min_trade_factor >= 0.0) {
            return Err(SetupError::InvalidTradeFactor(self.min_trade_factor));
        }
        Ok(())
    }

    /// Smallest |dq1| + |dq2| that counts as a trade
    pub fn min_sum_trade(&self) -> Amount {
        (self.amount_q1 + self.amount_q2) / self.num_actors as f64 * self.min_trade_factor
    }
}

impl Default for SetupParams {
    fn default() -> Self {
        SetupParams {
            seed: 1,
            num_actors: 100,
            amount_q1: 1000.0,
            amount_q2: 1000.0,
            alfa1: 0.5,
            alfa2: 0.5,
            min_trade_factor: 0.01,
            max_round_without_trade: 10,
            allocation: AllocationMethod::Rescaled,
        }
    }
}

/// The barter economy: ledger, pairing, history and the random stream
///
/// Nothing can be stepped before a successful `setup`. Cloning copies the
/// ledger, history, strategies and generator state, but not a previewed
/// situation: the clone draws a fresh one.
#[derive(Debug)]
pub struct Simulation {
    offer_strategy: OfferStrategy,
    acceptance_strategy: AcceptanceStrategy,
    params: Option<SetupParams>,
    utility: Utility,
    resources: [Vec<Amount>; 2],
    price: Amount,
    min_sum_trade: Amount,
    resolutions: Resolutions,
    scheduler: Option<PairingScheduler>,
    round_info: RoundInfo,
    history: History,
    pending: Option<EdgeworthSituation>,
    rng: StdRng,
}

impl Clone for Simulation {
    fn clone(&self) -> Self {
        Simulation {
            offer_strategy: self.offer_strategy,
            acceptance_strategy: self.acceptance_strategy,
            params: self.params.clone(),
            utility: self.utility,
            resources: self.resources.clone(),
            price: self.price,
            min_sum_trade: self.min_sum_trade,
            resolutions: self.resolutions,
            scheduler: self.scheduler.clone(),
            round_info: self.round_info.clone(),
            history: self.history.clone(),
            pending: None,
            rng: self.rng.clone(),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new(OfferStrategy::default(), AcceptanceStrategy::default())
    }
}

impl Simulation {
    pub fn new(offer_strategy: OfferStrategy, acceptance_strategy: AcceptanceStrategy) -> Self {
        Simulation {
            offer_strategy,
            acceptance_strategy,
            params: None,
            utility: Utility::default(),
            resources: [Vec::new(), Vec::new()],
            price: 0.0,
            min_sum_trade: 0.0,
            resolutions: Resolutions {
                q1: 0.0,
                q2: 0.0,
                utility: 0.0,
                wealth: 0.0,
            },
            scheduler: None,
            round_info: RoundInfo::default(),
            history: History::default(),
            pending: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Configure a fresh economy
    ///
    /// Validates every parameter first; on error nothing is modified.
    pub fn setup(&mut self, params: SetupParams) -> Result<(), SetupError> {
        params.validate()?;

        self.rng = StdRng::seed_from_u64(params.seed);
        self.history.reset();
        self.round_info.reset();
        self.pending = None;

        let amounts = [params.amount_q1, params.amount_q2];
        for good in Good::ALL {
            setup_resources(
                &mut self.resources[good.index()],
                amounts[good.index()],
                params.num_actors,
                params.allocation,
                &mut self.rng,
            );
        }

        self.utility = Utility::new(params.alfa1, params.alfa2);
        self.scheduler = Some(PairingScheduler::new(params.num_actors, &mut self.rng));
        self.min_sum_trade = params.min_sum_trade();
        self.price = params.amount_q1 / params.amount_q2;

        let num_actors = params.num_actors as f64;
        self.resolutions = Resolutions {
            q1: params.amount_q1 / num_actors / 8.0,
            q2: params.amount_q2 / num_actors / 8.0,
            utility: self.utility.compute(params.amount_q1, params.amount_q2) / num_actors / 8.0,
            wealth: (params.amount_q1 + params.amount_q2 * self.price) / num_actors / 8.0,
        };

        info!(
            seed = params.seed,
            num_actors = params.num_actors,
            amount_q1 = params.amount_q1,
            amount_q2 = params.amount_q2,
            offer = %self.offer_strategy,
            acceptance = %self.acceptance_strategy,
            min_sum_trade = self.min_sum_trade,
            "Simulation set up"
        );

        self.params = Some(params);
        self.record_initial();
        Ok(())
    }

    pub fn is_set_up(&self) -> bool {
        self.params.is_some()
    }

    /// The situation the next trade will use, built once and cached
    pub fn provide_next_situation(&mut self) -> &EdgeworthSituation {
        self.assert_set_up();
        let situation = match self.pending.take() {
            Some(situation) => situation,
            None => self.build_situation(),
        };
        self.pending.insert(situation)
    }

    /// Negotiate the current pair; returns true if this completed a round
    pub fn perform_next_trade(&mut self) -> bool {
        self.assert_set_up();
        let situation = match self.pending.take() {
            Some(situation) => situation,
            None => self.build_situation(),
        };

        debug!(
            actor1 = situation.actor1_idx,
            actor2 = situation.actor2_idx,
            q1 = situation.result.q1,
            q2 = situation.result.q2,
            accepted = situation.accepted,
            successful = situation.successful,
            "Trade attempt"
        );

        if situation.successful {
            self.apply(&situation);
            self.round_info.record(&situation);
        }

        let round_completed = match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.advance(&mut self.rng),
            None => unreachable!("scheduler exists once set up"),
        };

        if round_completed {
            self.record_round();
        }
        round_completed
    }

    /// Trade until the current round completes
    pub fn perform_next_round(&mut self) {
        while !self.perform_next_trade() {}
    }

    pub fn set_offer_strategy(&mut self, strategy: OfferStrategy) {
        self.offer_strategy = strategy;
        self.pending = None;
    }

    pub fn set_acceptance_strategy(&mut self, strategy: AcceptanceStrategy) {
        self.acceptance_strategy = strategy;
        self.pending = None;
    }

    pub fn offer_strategy(&self) -> OfferStrategy {
        self.offer_strategy
    }

    pub fn acceptance_strategy(&self) -> AcceptanceStrategy {
        self.acceptance_strategy
    }

    pub fn params(&self) -> Option<&SetupParams> {
        self.params.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn round_info(&self) -> &RoundInfo {
        &self.round_info
    }

    pub fn scheduler(&self) -> Option<&PairingScheduler> {
        self.scheduler.as_ref()
    }

    pub fn pending_situation(&self) -> Option<&EdgeworthSituation> {
        self.pending.as_ref()
    }

    pub fn utility(&self) -> Utility {
        self.utility
    }

    pub fn resources(&self, good: Good) -> &[Amount] {
        &self.resources[good.index()]
    }

    /// Current goods of one actor
    ///
    /// Panics before setup or when `actor_idx` is not an actor.
    pub fn holding(&self, actor_idx: usize) -> Position {
        self.assert_set_up();
        assert!(
            actor_idx < self.num_actors(),
            "actor index {actor_idx} out of range for {} actors",
            self.num_actors()
        );
        Position::new(self.resources[0][actor_idx], self.resources[1][actor_idx])
    }

    pub fn num_actors(&self) -> usize {
        self.resources[0].len()
    }

    pub fn sum_q1(&self) -> Amount {
        self.params.as_ref().map_or(0.0, |p| p.amount_q1)
    }

    pub fn sum_q2(&self) -> Amount {
        self.params.as_ref().map_or(0.0, |p| p.amount_q2)
    }

    /// Relative price of good 2 in units of good 1, fixed at setup
    pub fn price(&self) -> Amount {
        self.price
    }

    pub fn min_sum_trade(&self) -> Amount {
        self.min_sum_trade
    }

    /// Most successful trades a single round can have
    pub fn num_max_trade(&self) -> usize {
        self.num_actors() / 2
    }

    /// Whether the per-good sum still matches the configured total
    pub fn check_resources(&self, good: Good) -> bool {
        let expected = match good {
            Good::Q1 => self.sum_q1(),
            Good::Q2 => self.sum_q2(),
        };
        let sum: Amount = self.resources(good).iter().sum();
        let tolerance = CONSERVATION_TOLERANCE * self.num_actors().max(1) as f64 * expected.max(1.0);
        (sum - expected).abs() <= tolerance
    }

    pub fn compute_utilities(&self) -> Vec<Amount> {
        self.resources[0]
            .iter()
            .zip(&self.resources[1])
            .map(|(&q1, &q2)| self.utility.compute(q1, q2))
            .collect()
    }

    /// Wealth of every actor valued at the setup price: q1 + q2 * price
    pub fn compute_wealths(&self) -> Vec<Amount> {
        self.resources[0]
            .iter()
            .zip(&self.resources[1])
            .map(|(&q1, &q2)| q1 + q2 * self.price)
            .collect()
    }

    fn assert_set_up(&self) {
        assert!(
            self.is_set_up(),
            "Simulation must be set up successfully before trading"
        );
    }

    fn build_situation(&mut self) -> EdgeworthSituation {
        let (actor1_idx, actor2_idx) = match &self.scheduler {
            Some(scheduler) => scheduler.current_pair(),
            None => unreachable!("scheduler exists once set up"),
        };
        let pairing = Pairing {
            actor1_idx,
            actor2_idx,
            holding1: self.holding(actor1_idx),
            holding2: self.holding(actor2_idx),
        };
        let protocol = Protocol {
            utility: self.utility,
            offer: self.offer_strategy,
            acceptance: self.acceptance_strategy,
            min_sum_trade: self.min_sum_trade,
        };
        EdgeworthSituation::new(pairing, &protocol, &mut self.rng)
    }

    fn apply(&mut self, situation: &EdgeworthSituation) {
        let actor2_result = situation.actor2_result();
        self.resources[0][situation.actor1_idx] = situation.result.q1;
        self.resources[1][situation.actor1_idx] = situation.result.q2;
        self.resources[0][situation.actor2_idx] = actor2_result.q1;
        self.resources[1][situation.actor2_idx] = actor2_result.q2;
    }

    fn record_initial(&mut self) {
        let utilities = self.compute_utilities();
        let wealths = self.compute_wealths();
        let snapshot = Snapshot {
            q1: &self.resources[0],
            q2: &self.resources[1],
            utilities: &utilities,
            wealths: &wealths,
        };
        self.history.record_initial(&snapshot, &self.resolutions);
    }

    fn record_round(&mut self) {
        let utilities = self.compute_utilities();
        let wealths = self.compute_wealths();
        let snapshot = Snapshot {
            q1: &self.resources[0],
            q2: &self.resources[1],
            utilities: &utilities,
            wealths: &wealths,
        };
        self.history
            .record_round(&self.round_info, &snapshot, &self.resolutions);

        info!(
            round = self.history.time,
            num_successful = self.round_info.num_successful,
            q1_traded = self.round_info.q1_traded,
            q2_traded = self.round_info.q2_traded,
            "Round completed"
        );
        self.round_info.reset();
    }
}
