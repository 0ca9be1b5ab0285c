use approx::{assert_abs_diff_eq, assert_relative_eq};
use edgeworth_barter::strategy::sample_triangle;
use edgeworth_barter::{
    AcceptanceStrategy, AllocationMethod, EdgeworthBox, Good, OfferStrategy, Position,
    SetupParams, Simulation, Utility,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn params(seed: u64, num_actors: usize) -> SetupParams {
    SetupParams {
        seed,
        num_actors,
        amount_q1: 100.0,
        amount_q2: 100.0,
        alfa1: 0.5,
        alfa2: 0.5,
        min_trade_factor: 0.0,
        max_round_without_trade: 10,
        allocation: AllocationMethod::Rescaled,
    }
}

fn configured(
    offer: OfferStrategy,
    acceptance: AcceptanceStrategy,
    params: SetupParams,
) -> Simulation {
    let mut simulation = Simulation::new(offer, acceptance);
    simulation.setup(params).unwrap();
    simulation
}

fn sample_box() -> EdgeworthBox {
    EdgeworthBox::new(
        Position::new(10.0, 80.0),
        Position::new(90.0, 20.0),
        Utility::new(0.5, 0.5),
    )
}

#[test]
fn four_actor_round_scenario() {
    let mut simulation = Simulation::new(OfferStrategy::RandomTriangle, AcceptanceStrategy::HigherGain);
    simulation
        .setup(SetupParams {
            min_trade_factor: 0.01,
            ..params(1, 4)
        })
        .unwrap();
    simulation.perform_next_round();

    let history = simulation.history();
    assert_eq!(history.time, 1);
    assert_eq!(history.moments.len(), 2);
    assert_eq!(history.q1_traded.len(), 1);
    assert_eq!(history.num_successful.len(), 1);
    assert!(history.num_successful.values()[0] <= 2.0);

    let sum_q1: f64 = simulation.resources(Good::Q1).iter().sum();
    let sum_q2: f64 = simulation.resources(Good::Q2).iter().sum();
    assert_abs_diff_eq!(sum_q1, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(sum_q2, 100.0, epsilon = 1e-9);
}

#[test]
fn goods_conserved_every_round_for_every_strategy() {
    for offer in OfferStrategy::ALL {
        for acceptance in AcceptanceStrategy::ALL {
            let mut simulation = configured(offer, acceptance, params(3, 20));
            for _ in 0..25 {
                simulation.perform_next_round();
                for good in Good::ALL {
                    let sum: f64 = simulation.resources(good).iter().sum();
                    assert_abs_diff_eq!(sum, 100.0, epsilon = 1e-9 * 20.0);
                    assert!(simulation.check_resources(good));
                }
            }
        }
    }
}

#[test]
fn round_is_one_trade_per_pair() {
    let mut simulation = configured(
        OfferStrategy::RandomPareto,
        AcceptanceStrategy::Always,
        params(11, 10),
    );
    for round in 1..=4 {
        let mut trades = 1;
        while !simulation.perform_next_trade() {
            trades += 1;
        }
        assert_eq!(trades, simulation.num_max_trade());
        assert_eq!(simulation.history().time, round);
        assert!(simulation.scheduler().unwrap().was_restarted());
        assert_eq!(simulation.scheduler().unwrap().done(), 0);
    }
}

#[test]
fn perform_next_round_advances_time_by_one() {
    let mut simulation = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::HigherProportion,
        params(5, 8),
    );
    simulation.perform_next_trade();
    simulation.perform_next_round();
    assert_eq!(simulation.history().time, 1);
    simulation.perform_next_round();
    assert_eq!(simulation.history().time, 2);
    assert_eq!(simulation.history().moments.len(), 3);
}

#[test]
fn every_moment_counts_whole_population() {
    let num_actors = 30;
    let mut simulation = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::HigherGain,
        params(17, num_actors),
    );
    for _ in 0..10 {
        simulation.perform_next_round();
    }
    for moment in &simulation.history().moments {
        for (_, distribution) in moment.distributions() {
            assert_eq!(distribution.total_count(), num_actors);
            assert_eq!(distribution.bucket_centers.len(), distribution.counts.len());
        }
    }
}

#[test]
fn opposite_pareto_lands_on_pareto_set() {
    let mut simulation = configured(
        OfferStrategy::OppositePareto,
        AcceptanceStrategy::Always,
        params(23, 12),
    );
    for _ in 0..30 {
        let situation = simulation.provide_next_situation().clone();
        let on_line = situation.edgeworth.pareto_q2(situation.result.q1);
        assert_relative_eq!(situation.result.q2, on_line, max_relative = 1e-9);

        let change = situation.utility_change();
        assert_relative_eq!(change.actor2_new, change.actor2_original, max_relative = 1e-9);
        simulation.perform_next_trade();
    }
}

#[test]
fn accepted_offers_respect_acceptance_rule() {
    for acceptance in [
        AcceptanceStrategy::HigherGain,
        AcceptanceStrategy::HigherProportion,
    ] {
        let mut simulation = configured(OfferStrategy::RandomTriangle, acceptance, params(29, 16));
        for _ in 0..200 {
            let situation = simulation.provide_next_situation().clone();
            let (actor1_gain, actor2_gain) =
                acceptance.gains(&situation.utility_change()).unwrap();
            assert_eq!(situation.accepted, actor1_gain <= actor2_gain);
            if !situation.accepted {
                assert!(!situation.successful);
            }
            simulation.perform_next_trade();
        }
    }
}

#[test]
fn utility_never_falls_under_always_accept() {
    let mut simulation = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::Always,
        params(31, 20),
    );
    let mut previous = simulation.history().initial_sum_utility;
    for _ in 0..20 {
        simulation.perform_next_round();
        let current = simulation.history().sum_utilities.last().unwrap();
        assert!(current >= previous - 1e-9);
        previous = current;
    }
}

#[test]
fn identical_setups_are_deterministic() {
    let mut first = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::HigherGain,
        params(42, 24),
    );
    let mut second = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::HigherGain,
        params(42, 24),
    );
    for _ in 0..15 {
        first.perform_next_round();
        second.perform_next_round();
    }
    assert_eq!(first.history(), second.history());
    assert_eq!(first.resources(Good::Q1), second.resources(Good::Q1));
    assert_eq!(first.resources(Good::Q2), second.resources(Good::Q2));
}

#[test]
fn clone_continues_identically_and_independently() {
    let mut original = configured(
        OfferStrategy::RandomPareto,
        AcceptanceStrategy::HigherGain,
        params(8, 10),
    );
    original.perform_next_round();
    original.provide_next_situation();

    let mut copy = original.clone();
    assert!(copy.pending_situation().is_none());

    copy.perform_next_round();
    assert_eq!(copy.history().time, 2);
    assert_eq!(original.history().time, 1);

    let mut replay = original.clone();
    replay.perform_next_round();
    assert_eq!(replay.history(), copy.history());
}

#[test]
fn random_triangle_samples_average_to_centroid() {
    let edgeworth = sample_box();
    let p0 = edgeworth.actor1_holding();
    let p1 = edgeworth.curve1_pareto_intersection();
    let p2 = edgeworth.curve2_pareto_intersection();
    let centroid = Position::new((p0.q1 + p1.q1 + p2.q1) / 3.0, (p0.q2 + p1.q2 + p2.q2) / 3.0);

    let mut rng = StdRng::seed_from_u64(7);
    let num_samples = 10_000;
    let mut sum = Position::default();
    for _ in 0..num_samples {
        sum = sum + sample_triangle(p0, p1, p2, &mut rng);
    }
    let mean = sum * (1.0 / num_samples as f64);

    assert_abs_diff_eq!(mean.q1, centroid.q1, epsilon = 0.5);
    assert_abs_diff_eq!(mean.q2, centroid.q2, epsilon = 0.5);
}

#[test]
fn stick_breaking_economy_trades_and_conserves() {
    let mut simulation = configured(
        OfferStrategy::RandomTriangle,
        AcceptanceStrategy::HigherGain,
        SetupParams {
            allocation: AllocationMethod::StickBreaking,
            ..params(13, 16)
        },
    );
    assert!(simulation.resources(Good::Q1).iter().all(|&q| q >= 0.0));
    for _ in 0..10 {
        simulation.perform_next_round();
    }
    assert!(simulation.check_resources(Good::Q1));
    assert!(simulation.check_resources(Good::Q2));
    assert_eq!(simulation.history().moments.len(), 11);
}

#[test]
fn setup_again_starts_a_fresh_history() {
    let mut simulation = configured(
        OfferStrategy::RandomPareto,
        AcceptanceStrategy::Always,
        params(2, 6),
    );
    for _ in 0..3 {
        simulation.perform_next_round();
    }
    simulation.setup(params(2, 8)).unwrap();
    assert_eq!(simulation.history().time, 0);
    assert_eq!(simulation.history().moments.len(), 1);
    assert_eq!(simulation.num_actors(), 8);
    assert_eq!(simulation.round_info().num_successful, 0);
}
