use crate::Amount;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// How initial endowments of a good are split between actors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AllocationMethod {
    /// Independent uniform draws rescaled so they add up to the total
    #[default]
    #[serde(rename = "rescaled")]
    Rescaled,
    /// Cut [0, total) at sorted random pin points
    #[serde(rename = "stick breaking")]
    StickBreaking,
}

/// Fill `target` with `num_actors` non-negative amounts summing to `sum_amount`
pub fn setup_resources(
    target: &mut Vec<Amount>,
    sum_amount: Amount,
    num_actors: usize,
    method: AllocationMethod,
    rng: &mut StdRng,
) {
    target.clear();
    if num_actors == 0 {
        return;
    }
    match method {
        AllocationMethod::Rescaled => rescaled(target, sum_amount, num_actors, rng),
        AllocationMethod::StickBreaking => stick_breaking(target, sum_amount, num_actors, rng),
    }
}

fn rescaled(target: &mut Vec<Amount>, sum_amount: Amount, num_actors: usize, rng: &mut StdRng) {
    target.extend((0..num_actors).map(|_| rng.random::<f64>()));
    let sum: f64 = target.iter().sum();
    if sum <= 0.0 {
        // Every draw hit exactly zero; fall back to an even split
        target.iter_mut().for_each(|a| *a = sum_amount / num_actors as f64);
        return;
    }
    let scale = sum_amount / sum;
    target.iter_mut().for_each(|a| *a *= scale);
}

/// Top-up passes that redraw coinciding pins before duplicates are kept
const MAX_PIN_REDRAWS: usize = 16;

fn stick_breaking(
    target: &mut Vec<Amount>,
    sum_amount: Amount,
    num_actors: usize,
    rng: &mut StdRng,
) {
    // Exact duplicates are redrawn; on a stick too short to hold distinct
    // pins they are eventually kept and give zero-width pieces
    let mut pin_points: Vec<Amount> = Vec::with_capacity(num_actors);
    let mut redraws = 0;
    while pin_points.len() < num_actors {
        let missing = num_actors - pin_points.len();
        pin_points.extend((0..missing).map(|_| rng.random_range(0.0..sum_amount)));
        pin_points.sort_by(|a, b| a.total_cmp(b));
        if redraws < MAX_PIN_REDRAWS {
            pin_points.dedup();
            redraws += 1;
        }
    }

    target.resize(num_actors, 0.0);
    for actor_idx in 1..num_actors {
        target[actor_idx] = pin_points[actor_idx] - pin_points[actor_idx - 1];
    }
    // Actor 0 gets the piece that wraps around the end of the stick
    target[0] = pin_points[0] + (sum_amount - pin_points[num_actors - 1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn check_allocation(method: AllocationMethod) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut target = Vec::new();
        setup_resources(&mut target, 1000.0, 50, method, &mut rng);

        assert_eq!(target.len(), 50);
        assert!(target.iter().all(|&a| a >= 0.0));
        assert_relative_eq!(target.iter().sum::<f64>(), 1000.0, max_relative = 1e-12);
    }

    #[test]
    fn rescaled_conserves_total() {
        check_allocation(AllocationMethod::Rescaled);
    }

    #[test]
    fn stick_breaking_conserves_total() {
        check_allocation(AllocationMethod::StickBreaking);
    }

    #[test]
    fn stick_breaking_on_tiny_total() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut target = Vec::new();
        setup_resources(&mut target, 1e-15, 10, AllocationMethod::StickBreaking, &mut rng);

        assert_eq!(target.len(), 10);
        assert!(target.iter().all(|&a| a >= 0.0));
        assert_relative_eq!(target.iter().sum::<f64>(), 1e-15, max_relative = 1e-9);
    }

    #[test]
    fn stick_breaking_large_population() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut target = Vec::new();
        setup_resources(&mut target, 1.0, 20_000, AllocationMethod::StickBreaking, &mut rng);

        assert_eq!(target.len(), 20_000);
        assert!(target.iter().all(|&a| a >= 0.0));
        assert_relative_eq!(target.iter().sum::<f64>(), 1.0, max_relative = 1e-9);
    }

    #[test]
    fn setup_replaces_previous_contents() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut target = vec![5.0; 10];
        setup_resources(&mut target, 10.0, 4, AllocationMethod::Rescaled, &mut rng);
        assert_eq!(target.len(), 4);
    }

    #[test]
    fn same_seed_same_allocation() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        setup_resources(
            &mut a,
            100.0,
            8,
            AllocationMethod::StickBreaking,
            &mut StdRng::seed_from_u64(3),
        );
        setup_resources(
            &mut b,
            100.0,
            8,
            AllocationMethod::StickBreaking,
            &mut StdRng::seed_from_u64(3),
        );
        assert_eq!(a, b);
    }
}
